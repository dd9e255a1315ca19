//! Trailing statistical factors computed over one instrument's return history.

use core_types::stats::{mean, population_std, TRADING_DAYS_PER_YEAR, ZERO_STD};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trailing lookback window, expressed in months and mapped to trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lookback {
    Months12,
    Months9,
    Months6,
    Months3,
}

impl Lookback {
    pub fn trading_days(&self) -> usize {
        match self {
            Lookback::Months12 => 252,
            Lookback::Months9 => 189,
            Lookback::Months6 => 126,
            Lookback::Months3 => 63,
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            Lookback::Months12 => 12,
            Lookback::Months9 => 9,
            Lookback::Months6 => 6,
            Lookback::Months3 => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorKind {
    ZScore(Lookback),
    Sharpe(Lookback),
}

impl FactorKind {
    pub fn lookback(&self) -> Lookback {
        match self {
            FactorKind::ZScore(l) | FactorKind::Sharpe(l) => *l,
        }
    }

    /// Evaluates this factor over `history` (oldest first).
    pub fn compute(&self, history: &[f64]) -> Option<f64> {
        match self {
            FactorKind::ZScore(l) => zscore(history, l.trading_days()),
            FactorKind::Sharpe(l) => sharpe(history, l.trading_days()),
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorKind::ZScore(l) => write!(f, "zscore{}M", l.months()),
            FactorKind::Sharpe(l) => write!(f, "sharpe{}M", l.months()),
        }
    }
}

/// A named statistic for one instrument; `None` when it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub kind: FactorKind,
    pub value: Option<f64>,
}

impl FactorScore {
    pub fn name(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }
}

fn trailing(history: &[f64], window: usize) -> Option<&[f64]> {
    if window == 0 || history.len() < window {
        return None;
    }
    Some(&history[history.len() - window..])
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Standardized trailing-window mean:
/// `(mean(last window) - mean(history)) / std(history)`.
///
/// `history` is everything available before the evaluation date. Undefined with
/// fewer than `window` observations or a zero standard deviation.
pub fn zscore(history: &[f64], window: usize) -> Option<f64> {
    let recent = trailing(history, window)?;
    let std_all = population_std(history)?;
    if std_all <= ZERO_STD {
        return None;
    }
    finite((mean(recent)? - mean(history)?) / std_all)
}

/// Annualized Sharpe ratio of the trailing window: `mean / std * sqrt(252)`.
///
/// Undefined with fewer than `window` observations or a zero standard deviation.
pub fn sharpe(history: &[f64], window: usize) -> Option<f64> {
    let recent = trailing(history, window)?;
    let std = population_std(recent)?;
    if std <= ZERO_STD {
        return None;
    }
    finite(mean(recent)? / std * TRADING_DAYS_PER_YEAR.sqrt())
}

/// One [`FactorScore`] per requested kind.
pub fn score(history: &[f64], kinds: &[FactorKind]) -> Vec<FactorScore> {
    kinds
        .iter()
        .map(|&kind| FactorScore {
            kind,
            value: kind.compute(history),
        })
        .collect()
}

/// Average of the defined scores, or `None` if none are defined.
pub fn composite(scores: &[FactorScore]) -> Option<f64> {
    let defined: Vec<f64> = scores.iter().filter_map(|s| s.value).collect();
    mean(&defined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn alternating(n: usize, a: f64, b: f64) -> Vec<f64> {
        (0..n).map(|i| if i % 2 == 0 { a } else { b }).collect()
    }

    #[test]
    fn test_factor_names() {
        assert_eq!(FactorKind::Sharpe(Lookback::Months3).to_string(), "sharpe3M");
        assert_eq!(FactorKind::ZScore(Lookback::Months12).to_string(), "zscore12M");
    }

    #[test]
    fn test_sharpe_matches_closed_form() {
        // mean 0.005, population std 0.015 over the window
        let history = alternating(63, 0.02, -0.01);
        let window = &history[..62];
        let expected = mean(window).unwrap() / population_std(window).unwrap() * 252f64.sqrt();

        assert_abs_diff_eq!(sharpe(&history[..62], 62).unwrap(), expected, epsilon = 1e-12);
        assert!(sharpe(&history, 64).is_none());
    }

    #[test]
    fn test_sharpe_undefined_for_flat_returns() {
        assert!(sharpe(&vec![0.0; 100], 63).is_none());
        assert!(sharpe(&vec![0.001; 100], 63).is_none());
    }

    #[test]
    fn test_zscore_positive_when_recent_window_beats_history() {
        let mut history = alternating(200, 0.01, -0.01);
        history.extend(alternating(63, 0.02, 0.0));

        let z = zscore(&history, 63).unwrap();
        assert!(z > 0.0);

        let m_all = mean(&history).unwrap();
        let m_recent = mean(&history[history.len() - 63..]).unwrap();
        let s_all = population_std(&history).unwrap();
        assert_abs_diff_eq!(z, (m_recent - m_all) / s_all, epsilon = 1e-12);
    }

    #[test]
    fn test_zscore_undefined_with_short_history() {
        assert!(zscore(&alternating(50, 0.01, -0.01), 63).is_none());
        assert!(zscore(&[], 0).is_none());
    }

    #[test]
    fn test_composite_skips_undefined_scores() {
        let scores = vec![
            FactorScore { kind: FactorKind::Sharpe(Lookback::Months12), value: None },
            FactorScore { kind: FactorKind::Sharpe(Lookback::Months6), value: Some(1.0) },
            FactorScore { kind: FactorKind::Sharpe(Lookback::Months3), value: Some(2.0) },
        ];
        assert_abs_diff_eq!(composite(&scores).unwrap(), 1.5, epsilon = 1e-12);

        let none = vec![FactorScore { kind: FactorKind::Sharpe(Lookback::Months3), value: None }];
        assert!(composite(&none).is_none());
    }

    #[test]
    fn test_score_reports_every_requested_kind() {
        let history = alternating(130, 0.02, -0.01);
        let kinds = [
            FactorKind::Sharpe(Lookback::Months12),
            FactorKind::Sharpe(Lookback::Months6),
            FactorKind::Sharpe(Lookback::Months3),
        ];
        let scores = score(&history, &kinds);

        assert_eq!(scores.len(), 3);
        assert!(!scores[0].is_defined());
        assert!(scores[1].is_defined());
        assert!(scores[2].is_defined());
        assert_eq!(scores[2].name(), "sharpe3M");
    }
}
