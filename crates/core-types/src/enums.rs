use crate::error::CoreError;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often the held instrument set is re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RebalanceFrequency {
    Monthly,
    Quarterly,
}

impl RebalanceFrequency {
    /// Number of calendar months in one holding period.
    pub fn months(&self) -> u32 {
        match self {
            RebalanceFrequency::Monthly => 1,
            RebalanceFrequency::Quarterly => 3,
        }
    }

    /// The `k`-th rebalance date of a schedule anchored on `anchor`.
    ///
    /// Always measured from the anchor and clamped to the last day of the target
    /// month, so an anchor of 2023-01-31 gives 2023-02-28, then 2023-03-31.
    /// Returns `None` only on calendar overflow.
    pub fn nth_rebalance(&self, anchor: NaiveDate, k: u32) -> Option<NaiveDate> {
        let months = self.months().checked_mul(k)?;
        anchor.checked_add_months(Months::new(months))
    }
}

impl fmt::Display for RebalanceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalanceFrequency::Monthly => write!(f, "Monthly"),
            RebalanceFrequency::Quarterly => write!(f, "Quarterly"),
        }
    }
}

impl FromStr for RebalanceFrequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" => Ok(RebalanceFrequency::Monthly),
            "quarterly" => Ok(RebalanceFrequency::Quarterly),
            _ => Err(CoreError::UnknownVariant {
                kind: "rebalance frequency",
                value: s.to_string(),
            }),
        }
    }
}

/// Names which trailing factors are averaged into an instrument's composite score.
///
/// The numeric suffix lists the lookback windows in months, e.g. `avgSharpe12_6_3`
/// averages the 12, 6 and 3 month annualized Sharpe ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankingMethod {
    #[serde(rename = "avgZScore12_6_3")]
    AvgZScore12_6_3,
    #[serde(rename = "avgSharpe12_6_3")]
    AvgSharpe12_6_3,
    #[serde(rename = "avgSharpe9_6_3")]
    AvgSharpe9_6_3,
}

impl RankingMethod {
    pub const ALL: [RankingMethod; 3] = [
        RankingMethod::AvgZScore12_6_3,
        RankingMethod::AvgSharpe12_6_3,
        RankingMethod::AvgSharpe9_6_3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMethod::AvgZScore12_6_3 => "avgZScore12_6_3",
            RankingMethod::AvgSharpe12_6_3 => "avgSharpe12_6_3",
            RankingMethod::AvgSharpe9_6_3 => "avgSharpe9_6_3",
        }
    }
}

impl fmt::Display for RankingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankingMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "ranking method",
                value: s.to_string(),
            })
    }
}

/// Selects how a ranked list is turned into portfolio weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingKind {
    #[default]
    Equal,
    ScoreWeighted,
}

impl fmt::Display for WeightingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightingKind::Equal => write!(f, "equal"),
            WeightingKind::ScoreWeighted => write!(f, "score_weighted"),
        }
    }
}

impl FromStr for WeightingKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "equal" => Ok(WeightingKind::Equal),
            "score_weighted" => Ok(WeightingKind::ScoreWeighted),
            _ => Err(CoreError::UnknownVariant {
                kind: "weighting scheme",
                value: s.to_string(),
            }),
        }
    }
}
