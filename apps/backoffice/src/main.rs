//! # Back-Office Command Line
//!
//! ## Usage
//! ```bash
//! backoffice dashboard
//! backoffice watch                      # live dashboard, Ctrl-C to stop
//! backoffice medicines
//! backoffice history <medicine-id>
//! backoffice restock <medicine-id> <quantity>
//! backoffice invoices
//! backoffice set-status <invoice-id> <Pending|Partially Paid|Paid>
//! backoffice delete-invoice <invoice-id>
//!
//! # Use a specific config file
//! backoffice --config ./backoffice.toml dashboard
//! ```
//!
//! A failed command prints the notification text and exits with status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};

use medstore_backoffice::{init_tracing, ApiError, Backoffice, BackofficeConfig, BackofficeError};
use medstore_core::{DashboardReport, PaymentStatus};

enum Command {
    Dashboard,
    Watch,
    Medicines,
    History { medicine_id: String },
    Restock { medicine_id: String, quantity: i64 },
    Invoices,
    SetStatus { invoice_id: String, status: PaymentStatus },
    DeleteInvoice { invoice_id: String },
    Help,
}

fn print_help() {
    println!("Medstore Back-Office");
    println!();
    println!("Usage: backoffice [--config PATH] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  dashboard                        Print dashboard totals");
    println!("  watch                            Print dashboard totals on every change");
    println!("  medicines                        List medicines");
    println!("  history <medicine-id>            Show a medicine's history");
    println!("  restock <medicine-id> <qty>      Add stock");
    println!("  invoices                         List invoices, newest first");
    println!("  set-status <invoice-id> <status> Overwrite an invoice's payment status");
    println!("  delete-invoice <invoice-id>      Delete an invoice (stock is not restored)");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>   Config file (default: platform config dir)");
    println!("  -h, --help            Show this help message");
}

fn parse_args(args: &[String]) -> anyhow::Result<(Option<PathBuf>, Command)> {
    let mut config_path = None;
    let mut rest: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("--config needs a path"))?;
                config_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--help" | "-h" => return Ok((config_path, Command::Help)),
            other => rest.push(other),
        }
        i += 1;
    }

    let arg = |n: usize, what: &str| -> anyhow::Result<String> {
        rest.get(n)
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("missing {}", what))
    };

    let command = match rest.first().copied() {
        None | Some("help") => Command::Help,
        Some("dashboard") => Command::Dashboard,
        Some("watch") => Command::Watch,
        Some("medicines") => Command::Medicines,
        Some("history") => Command::History {
            medicine_id: arg(1, "medicine id")?,
        },
        Some("restock") => Command::Restock {
            medicine_id: arg(1, "medicine id")?,
            quantity: arg(2, "quantity")?
                .parse()
                .context("quantity must be a whole number")?,
        },
        Some("invoices") => Command::Invoices,
        Some("set-status") => Command::SetStatus {
            invoice_id: arg(1, "invoice id")?,
            // "Partially Paid" may arrive as two words
            status: rest[2..]
                .join(" ")
                .parse()
                .map_err(|e: medstore_core::ValidationError| anyhow!(e))?,
        },
        Some("delete-invoice") => Command::DeleteInvoice {
            invoice_id: arg(1, "invoice id")?,
        },
        Some(other) => bail!("unknown command '{}', try --help", other),
    };

    Ok((config_path, command))
}

fn print_report(report: &DashboardReport) {
    println!("Medicines:        {}", report.medicine_count);
    println!("Total stock:      {}", report.total_stock);
    println!("Inventory value:  {}", report.total_inventory_value);
    println!("Low stock:        {}", report.low_stock_count);
    println!("Invoices:         {}", report.invoice_count);
    println!("Total sales:      {}", report.total_sales);
    println!("Paid:             {}", report.paid_amount);
    println!("Pending:          {}", report.pending_amount);
    println!("Profit:           {}", report.total_profit);
}

async fn run(backoffice: &Backoffice, command: Command) -> Result<(), BackofficeError> {
    match command {
        Command::Help => print_help(),
        Command::Dashboard => print_report(&backoffice.dashboard().await?),
        Command::Watch => {
            let mut handle = backoffice.watch_dashboard();
            loop {
                tokio::select! {
                    next = handle.changed() => match next {
                        Some(report) => {
                            print_report(&report);
                            println!();
                        }
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            handle.stop();
        }
        Command::Medicines => {
            for m in backoffice.catalog().list_medicines().await? {
                println!(
                    "{:<38} {:<30} stock {:>5}  cost {:>10}  sell {:>10}",
                    m.id, m.name, m.stock, m.price, m.selling_price
                );
            }
        }
        Command::History { medicine_id } => {
            for entry in &backoffice.ledger().get_history(&medicine_id).await? {
                println!("{}  {}", entry.date, entry.action);
            }
        }
        Command::Restock {
            medicine_id,
            quantity,
        } => {
            let adj = backoffice.ledger().restock(&medicine_id, quantity).await?;
            println!("{}: {} -> {}", adj.medicine_name, adj.previous, adj.new_stock);
        }
        Command::Invoices => {
            for inv in backoffice.invoices().list_invoices().await? {
                println!(
                    "{:<38} {}  {:<24} {:>10}  {}",
                    inv.id,
                    inv.date.format("%Y-%m-%d %H:%M"),
                    inv.to.name,
                    inv.total,
                    inv.payment_status
                );
            }
        }
        Command::SetStatus { invoice_id, status } => {
            backoffice
                .invoices()
                .update_payment_status(&invoice_id, status)
                .await?;
            println!("{} -> {}", invoice_id, status);
        }
        Command::DeleteInvoice { invoice_id } => {
            backoffice.invoices().delete_invoice(&invoice_id).await?;
            println!("Deleted {}", invoice_id);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, command) = parse_args(&args)?;

    if let Command::Help = command {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    let config = BackofficeConfig::load(config_path).context("loading configuration")?;
    init_tracing(Some(&config.logging.filter));

    let outcome = match Backoffice::open(&config).await {
        Ok(backoffice) => run(&backoffice, command).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{}", ApiError::from(e).message);
            Ok(ExitCode::FAILURE)
        }
    }
}
