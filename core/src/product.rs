//! Product catalog: representative imported products, each owned
//! by exactly one registry sector.

use crate::{
    error::{DashError, DashResult},
    sector::SectorRegistry,
    types::SectorCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub name:        String,
    pub sector_code: SectorCode,
    /// Rate (%) typically applied to this product.
    pub tax_rate:    f64,
    /// Baseline monthly volume.
    pub volume:      f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    /// Build a catalog, checking every product against the registry.
    pub fn new(products: Vec<Product>, registry: &SectorRegistry) -> DashResult<Self> {
        for product in &products {
            registry.get(&product.sector_code)?;
            if !product.tax_rate.is_finite() || product.tax_rate < 0.0 {
                return Err(DashError::InvalidConfig {
                    reason: format!("product {} has negative tax rate", product.name),
                });
            }
            if products.iter().filter(|p| p.name == product.name).count() > 1 {
                return Err(DashError::InvalidConfig {
                    reason: format!("duplicate product {}", product.name),
                });
            }
        }
        Ok(Self { products })
    }

    pub fn standard(registry: &SectorRegistry) -> DashResult<Self> {
        let products = [
            ("Passenger vehicles", "AUTOMOTIVE", 12.2, 12_000.0),
            ("Fuels", "ENERGY", 2.2, 420_000.0),
            ("Alcoholic beverages", "BEVERAGES", 8.5, 85_000.0),
            ("Building materials", "CONSTRUCTION", 2.1, 280_000.0),
            ("Food products", "AGRIFOOD", 1.8, 320_000.0),
            ("Fruit and vegetables", "AGRICULTURE", 1.3, 450_000.0),
            ("Electronic equipment", "ICT", 2.7, 88_000.0),
            ("Medicines", "PHARMACEUTICAL", 0.8, 65_000.0),
            ("Furniture", "CONSUMER_GOODS", 3.1, 45_000.0),
            ("Industrial machinery", "CAPITAL_GOODS", 2.9, 35_000.0),
        ]
        .into_iter()
        .map(|(name, sector_code, tax_rate, volume)| Product {
            name: name.into(),
            sector_code: sector_code.into(),
            tax_rate,
            volume,
        })
        .collect();
        Self::new(products, registry)
    }

    pub fn get(&self, name: &str) -> DashResult<&Product> {
        self.products
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| DashError::UnknownProduct { name: name.to_string() })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn for_sector<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products.iter().filter(move |p| p.sector_code == code)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
