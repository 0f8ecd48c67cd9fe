//! Tax calculator: amount due on a declared value for one product.
//!
//! amount = declared_value × rate / 100, where the rate is the chosen
//! tier of the product's sector.

use crate::{
    error::{DashError, DashResult},
    product::ProductCatalog,
    sector::{RateTier, SectorRegistry},
    types::SectorCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxRequest {
    pub product:        String,
    pub declared_value: f64,
    pub tier:           RateTier,
    #[serde(default = "default_quantity")]
    pub quantity:       u32,
}

fn default_quantity() -> u32 {
    1
}

impl TaxRequest {
    pub fn new(product: impl Into<String>, declared_value: f64, tier: RateTier) -> Self {
        Self {
            product: product.into(),
            declared_value,
            tier,
            quantity: default_quantity(),
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxQuote {
    pub product:         String,
    pub sector_code:     SectorCode,
    pub tier:            RateTier,
    /// Percentage applied.
    pub rate:            f64,
    pub taxable_value:   f64,
    pub amount:          f64,
    pub quantity:        u32,
    /// Display figure only: `amount` spread over `quantity`. The tax
    /// due is always `amount`, whatever the quantity.
    pub amount_per_unit: f64,
}

pub fn calculate(
    registry: &SectorRegistry,
    catalog: &ProductCatalog,
    request: &TaxRequest,
) -> DashResult<TaxQuote> {
    let value = request.declared_value;
    if !value.is_finite() || value < 0.0 {
        log::debug!("Rejected declared value {value} for {}", request.product);
        return Err(DashError::invalid_input(
            "declared_value",
            format!("must be a finite value >= 0, got {value}"),
        ));
    }
    if request.quantity == 0 {
        return Err(DashError::invalid_input("quantity", "must be at least 1"));
    }

    let product = catalog.get(&request.product)?;
    let sector = registry.get(&product.sector_code)?;
    let rate = sector.rate(request.tier);
    let amount = value * rate / 100.0;

    Ok(TaxQuote {
        product: product.name.clone(),
        sector_code: sector.code.clone(),
        tier: request.tier,
        rate,
        taxable_value: value,
        amount,
        quantity: request.quantity,
        amount_per_unit: amount / f64::from(request.quantity),
    })
}
