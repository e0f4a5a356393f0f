//! # Seed Data Generator
//!
//! Populates a SQLite store with lookup lists and medicines for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 medicines (default)
//! cargo run -p medstore-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p medstore-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p medstore-db --bin seed -- --db ./data/medstore.db
//! ```
//!
//! Each medicine gets a cost price of ₹2 to ₹60, a selling price 20-45%
//! above cost, a stock level of 0 to 120 (so some show as low stock) and an
//! opening history entry.

use chrono::Utc;
use std::env;

use medstore_core::stock::added_to_inventory;
use medstore_core::{History, HistoryEntry, Medicine, MedicineCategory, MedicineType, Money};
use medstore_db::{Database, DbConfig, LookupRepository, MedicineRepository};

const TYPES: &[&str] = &["Tablet", "Capsule", "Syrup", "Injection", "Ointment", "Drops"];

/// Categories with representative generic names.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Analgesic",
        &["Paracetamol", "Ibuprofen", "Diclofenac", "Naproxen", "Aspirin"],
    ),
    (
        "Antibiotic",
        &["Amoxicillin", "Azithromycin", "Ciprofloxacin", "Cefixime", "Doxycycline"],
    ),
    (
        "Antihistamine",
        &["Cetirizine", "Loratadine", "Fexofenadine", "Chlorpheniramine"],
    ),
    (
        "Antacid",
        &["Omeprazole", "Esomeprazole", "Ranitidine", "Famotidine"],
    ),
    (
        "Antidiabetic",
        &["Metformin", "Glimepiride", "Sitagliptin", "Gliclazide"],
    ),
    (
        "Cardiovascular",
        &["Amlodipine", "Atorvastatin", "Losartan", "Bisoprolol", "Clopidogrel"],
    ),
    ("Vitamin", &["Vitamin C", "Vitamin D3", "Folic Acid", "Zinc"]),
];

const STRENGTHS: &[&str] = &["5mg", "10mg", "20mg", "250mg", "500mg", "1g"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./medstore_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Medstore Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of medicines to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./medstore_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Medstore Seed Data Generator");
    println!("===============================");
    println!("Database:  {}", db_path);
    println!("Medicines: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let store = db.clone().into_shared();
    let medicines = MedicineRepository::new(store.clone());

    let existing = medicines.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} medicines", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let types = LookupRepository::<MedicineType>::new(store.clone());
    for name in TYPES {
        types.add(name).await?;
    }
    let categories = LookupRepository::<MedicineCategory>::new(store.clone());
    for (name, _) in CATEGORIES {
        categories.add(name).await?;
    }
    println!("✓ {} types, {} categories", TYPES.len(), CATEGORIES.len());

    println!();
    println!("Generating medicines...");

    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut seed = 0;

    'outer: for (category, names) in CATEGORIES {
        for name in names.iter() {
            for strength in STRENGTHS {
                if generated >= count {
                    break 'outer;
                }

                let medicine = generate_medicine(category, name, strength, seed);
                seed += 1;

                if let Err(e) = medicines.insert(&medicine).await {
                    eprintln!("Failed to insert {}: {}", medicine.name, e);
                    continue;
                }
                generated += 1;

                if generated % 50 == 0 {
                    println!("  Generated {} medicines...", generated);
                }
            }
        }
    }

    println!();
    println!("✓ Generated {} medicines in {:?}", generated, start.elapsed());

    db.close().await;
    println!("✓ Seed complete!");

    Ok(())
}

fn generate_medicine(category: &str, name: &str, strength: &str, seed: usize) -> Medicine {
    let full_name = format!("{} {}", name, strength);
    let stock = ((seed * 37) % 121) as i64;

    // ₹2.00 - ₹59.99
    let cost = Money::from_paise(200 + ((seed * 733) % 5800) as i64);
    // 20-45% margin
    let margin = 120 + (seed % 26) as i64;
    let selling = Money::from_paise(cost.paise() * margin / 100);

    let history = History::new().append(HistoryEntry::new(
        added_to_inventory(&full_name, stock),
        Utc::now(),
    ));

    Medicine {
        id: String::new(),
        name: full_name,
        category: category.to_string(),
        medicine_type: TYPES[seed % TYPES.len()].to_string(),
        power: strength.to_string(),
        price: cost,
        selling_price: selling,
        stock,
        history,
    }
}
