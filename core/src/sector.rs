//! Sector registry: static reference data for every economic sector.
//!
//! The registry is built once at engine start and never mutated.
//! Iteration order is canonical: ascending by sector code.

use crate::{
    error::{DashError, DashResult},
    types::SectorCode,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sector {
    pub code:          SectorCode,
    pub name:          String,
    pub category:      String,
    pub sub_category:  String,
    /// Percentages.
    pub normal_rate:   f64,
    pub reduced_rate:  f64,
    pub specific_rate: f64,
    /// Relative economic weight (%). Weights need not sum to 100.
    pub weight:        f64,
    /// Baseline monthly import volume.
    pub import_volume: f64,
    pub description:   String,
}

impl Sector {
    pub fn rate(&self, tier: RateTier) -> f64 {
        match tier {
            RateTier::Normal   => self.normal_rate,
            RateTier::Reduced  => self.reduced_rate,
            RateTier::Specific => self.specific_rate,
        }
    }
}

/// Mutually exclusive tax-rate tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RateTier {
    Normal,
    Reduced,
    Specific,
}

impl RateTier {
    pub const ALL: [RateTier; 3] = [RateTier::Normal, RateTier::Reduced, RateTier::Specific];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal   => "normal",
            Self::Reduced  => "reduced",
            Self::Specific => "specific",
        }
    }
}

impl fmt::Display for RateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateTier {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal"   => Ok(Self::Normal),
            "reduced"  => Ok(Self::Reduced),
            "specific" => Ok(Self::Specific),
            other => Err(DashError::invalid_input(
                "rate_tier",
                format!("expected normal|reduced|specific, got '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorRegistry {
    sectors: BTreeMap<SectorCode, Sector>,
}

impl SectorRegistry {
    /// Build a registry, rejecting duplicate codes and negative
    /// rates, weights or volumes.
    pub fn from_sectors(sectors: Vec<Sector>) -> DashResult<Self> {
        let mut map = BTreeMap::new();
        for sector in sectors {
            let numbers = [
                ("normal_rate", sector.normal_rate),
                ("reduced_rate", sector.reduced_rate),
                ("specific_rate", sector.specific_rate),
                ("weight", sector.weight),
                ("import_volume", sector.import_volume),
            ];
            if let Some((field, value)) = numbers.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
                return Err(DashError::InvalidConfig {
                    reason: format!("sector {} has invalid {field} {value}", sector.code),
                });
            }
            if map.contains_key(&sector.code) {
                return Err(DashError::InvalidConfig {
                    reason: format!("duplicate sector code {}", sector.code),
                });
            }
            map.insert(sector.code.clone(), sector);
        }
        Ok(Self { sectors: map })
    }

    /// The ten reference sectors of the regional import tax.
    pub fn standard() -> Self {
        let sectors = standard_sectors()
            .into_iter()
            .map(|s| (s.code.clone(), s))
            .collect();
        Self { sectors }
    }

    /// The full code → sector mapping, in canonical order.
    pub fn sectors(&self) -> &BTreeMap<SectorCode, Sector> {
        &self.sectors
    }

    pub fn get(&self, code: &str) -> DashResult<&Sector> {
        self.sectors.get(code).ok_or_else(|| DashError::UnknownSector {
            code: code.to_string(),
        })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.sectors.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.values()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.sectors.keys().map(String::as_str)
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.iter().map(|s| s.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

#[allow(clippy::too_many_arguments)]
fn sector(
    code: &str,
    name: &str,
    category: &str,
    sub_category: &str,
    rates: (f64, f64, f64),
    weight: f64,
    import_volume: f64,
    description: &str,
) -> Sector {
    Sector {
        code: code.into(),
        name: name.into(),
        category: category.into(),
        sub_category: sub_category.into(),
        normal_rate: rates.0,
        reduced_rate: rates.1,
        specific_rate: rates.2,
        weight,
        import_volume,
        description: description.into(),
    }
}

fn standard_sectors() -> Vec<Sector> {
    vec![
        sector("AGRICULTURE", "Agricultural Produce", "Food", "Fruit & Vegetables",
               (2.5, 1.3, 0.0), 15.2, 450_000.0, "Fresh fruit, vegetables and farm produce"),
        sector("AGRIFOOD", "Food Processing Industry", "Food", "Processed Goods",
               (3.2, 1.8, 0.5), 22.8, 320_000.0, "Processed food products"),
        sector("BEVERAGES", "Beverages and Spirits", "Food", "Liquids",
               (5.8, 3.2, 8.5), 8.5, 180_000.0, "Alcoholic and non-alcoholic beverages"),
        sector("CONSTRUCTION", "Building Materials", "Industry", "Materials",
               (4.2, 2.1, 1.5), 12.3, 280_000.0, "Cement, steel, construction materials"),
        sector("AUTOMOTIVE", "Vehicles and Parts", "Transport", "Vehicles",
               (6.5, 3.8, 12.2), 9.8, 75_000.0, "Cars and spare parts"),
        sector("ENERGY", "Petroleum Products", "Energy", "Fuels",
               (3.8, 2.2, 0.8), 14.7, 420_000.0, "Fuels and lubricants"),
        sector("CAPITAL_GOODS", "Capital Equipment", "Industry", "Machinery",
               (4.8, 2.9, 3.2), 7.2, 95_000.0, "Machinery and industrial equipment"),
        sector("CONSUMER_GOODS", "Consumer Goods", "Retail", "Miscellaneous",
               (5.2, 3.1, 4.5), 16.5, 210_000.0, "Appliances, furniture, textiles"),
        sector("PHARMACEUTICAL", "Pharmaceutical Products", "Health", "Medicines",
               (1.2, 0.8, 0.3), 4.8, 65_000.0, "Medicines and health products"),
        sector("ICT", "Information Technology", "High-Tech", "Electronics",
               (4.5, 2.7, 6.8), 5.2, 88_000.0, "Computers, phones, electronics"),
    ]
}
