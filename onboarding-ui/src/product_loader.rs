//! CSV loader for the paywall product catalog.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does **not** matter.
//!
//! | Column   | Required | Type    | Notes                               |
//! |----------|----------|---------|-------------------------------------|
//! | `period` | yes      | string  | `yearly` or `monthly` (any case)    |
//! | `price`  | yes      | decimal | Must be greater than zero           |
//!
//! Rows are offered on the paywall in file order.
//!
//! ```csv
//! period,price
//! yearly,59.99
//! monthly,7.99
//! ```
use std::io::Read;
use std::path::Path;

use onboarding_core::{BillingPeriod, PaywallProduct};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CsvRow {
    period: String,
    price: Decimal,
}

/// Errors that can occur while loading the product catalog.
#[derive(Debug, thiserror::Error)]
pub enum ProductLoadError {
    /// Bad structure, missing column, unreadable file or non-decimal price.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based, the header being row 0.
    #[error("unrecognised billing period '{period}' on row {row}")]
    InvalidPeriod { period: String, row: usize },

    #[error("price {price} on row {row} must be greater than zero")]
    NonPositivePrice { price: Decimal, row: usize },
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<PaywallProduct, ProductLoadError> {
    let period = BillingPeriod::parse(&row.period).ok_or_else(|| {
        ProductLoadError::InvalidPeriod {
            period: row.period.clone(),
            row: row_number,
        }
    })?;

    if row.price <= Decimal::ZERO {
        return Err(ProductLoadError::NonPositivePrice {
            price: row.price,
            row: row_number,
        });
    }

    Ok(PaywallProduct {
        period,
        price: row.price,
    })
}

/// Parse products from any reader. Stops at the first bad row.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<PaywallProduct>, ProductLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(index, row)| convert_row(row?, index + 1))
        .collect()
}

pub fn load_from_str(data: &str) -> Result<Vec<PaywallProduct>, ProductLoadError> {
    load_from_reader(data.as_bytes())
}

pub fn load_from_file(path: &Path) -> Result<Vec<PaywallProduct>, ProductLoadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    reader
        .into_deserialize::<CsvRow>()
        .enumerate()
        .map(|(index, row)| convert_row(row?, index + 1))
        .collect()
}
