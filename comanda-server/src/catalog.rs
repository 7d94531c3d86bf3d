//! Catalog bootstrap
//!
//! Ensures the virtual delivery / to-go tables exist and applies a JSON seed
//! file once, when no products are stored yet.

use crate::orders::storage::{OrderStorage, StorageError};
use serde::Deserialize;
use shared::models::{
    DELIVERY_TABLE_NUMBER, DiningTable, Product, TAKEAWAY_TABLE_NUMBER, TableStatus,
};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid seed data: {0}")]
    Invalid(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Seed file contents
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub tables: Vec<DiningTable>,
}

/// What a bootstrap run wrote
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeedReport {
    pub products: usize,
    pub tables: usize,
    pub virtual_tables: usize,
}

pub struct Catalog;

impl Catalog {
    /// Bootstrap the catalog, reading `seed_file` when given
    pub fn seed(storage: &OrderStorage, seed_file: Option<&Path>) -> Result<SeedReport, SeedError> {
        let seed = match seed_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Some(serde_json::from_str::<CatalogSeed>(&raw)?)
            }
            None => None,
        };
        Self::apply(storage, seed)
    }

    /// Bootstrap from already parsed seed data
    pub fn apply(storage: &OrderStorage, seed: Option<CatalogSeed>) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();
        let existing_tables = storage.list_tables()?;
        let catalog_empty = storage.list_products()?.is_empty();

        let txn = storage.begin_write()?;

        let mut tables = existing_tables;
        if let Some(seed) = seed.filter(|_| catalog_empty) {
            validate(&seed)?;
            for product in &seed.products {
                storage.put_product(&txn, product)?;
                report.products += 1;
            }
            for table in seed.tables {
                if tables.iter().any(|t| t.id == table.id) {
                    continue;
                }
                let mut table = table;
                if table.is_virtual() {
                    table.status = TableStatus::Free;
                }
                storage.put_table(&txn, &table)?;
                tables.push(table);
                report.tables += 1;
            }
        }

        // Virtual slots are always present
        let mut next_id = tables.iter().map(|t| t.id).max().unwrap_or(0);
        for number in [DELIVERY_TABLE_NUMBER, TAKEAWAY_TABLE_NUMBER] {
            if tables.iter().any(|t| t.number == number) {
                continue;
            }
            next_id += 1;
            storage.put_table(
                &txn,
                &DiningTable {
                    id: next_id,
                    number,
                    capacity: 0,
                    status: TableStatus::Free,
                    is_active: true,
                },
            )?;
            report.virtual_tables += 1;
        }

        txn.commit().map_err(StorageError::from)?;
        tracing::info!(
            products = report.products,
            tables = report.tables,
            virtual_tables = report.virtual_tables,
            "Catalog bootstrap finished"
        );
        Ok(report)
    }
}

fn validate(seed: &CatalogSeed) -> Result<(), SeedError> {
    for product in &seed.products {
        if product.name.trim().is_empty() {
            return Err(SeedError::Invalid(format!("product {} has no name", product.id)));
        }
        if product.price.is_sign_negative() {
            return Err(SeedError::Invalid(format!(
                "product {} has a negative price",
                product.id
            )));
        }
    }
    let mut numbers: Vec<u32> = seed.tables.iter().map(|t| t.number).collect();
    numbers.sort_unstable();
    if numbers.windows(2).any(|w| w[0] == w[1]) {
        return Err(SeedError::Invalid("duplicate table number".to_string()));
    }
    Ok(())
}
