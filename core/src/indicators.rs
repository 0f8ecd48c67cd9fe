//! Regional economic indicators shown alongside the revenue figures.
//! Re-sampled every tick around fixed reference levels.

use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomicIndicator {
    pub name:   String,
    /// Percent.
    pub value:  f64,
    /// Percentage-point change versus the prior period.
    pub change: f64,
}

struct IndicatorSpec {
    name:   &'static str,
    level:  f64,
    spread: f64,
    change: (f64, f64),
}

const INDICATORS: [IndicatorSpec; 4] = [
    IndicatorSpec { name: "Regional inflation", level: 2.8,  spread: 0.2, change: (-0.1, 0.1) },
    IndicatorSpec { name: "GDP growth",         level: 3.2,  spread: 0.3, change: (-0.2, 0.2) },
    IndicatorSpec { name: "Unemployment rate",  level: 18.5, spread: 0.5, change: (-0.3, 0.1) },
    IndicatorSpec { name: "Total imports",      level: 4.8,  spread: 0.2, change: (-1.0, 2.0) },
];

pub fn sample_indicators<R: RandomSource>(rng: &mut R) -> Vec<EconomicIndicator> {
    INDICATORS
        .iter()
        .map(|spec| EconomicIndicator {
            name: spec.name.to_string(),
            value: spec.level + rng.uniform(-spec.spread, spec.spread),
            change: rng.uniform(spec.change.0, spec.change.1),
        })
        .collect()
}
