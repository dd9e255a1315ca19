use crate::error::PortfolioError;
use core_types::{InstrumentId, Portfolio, RankedInstrument};
use std::collections::BTreeMap;

/// Assigns target weights to a ranked instrument list.
///
/// An empty list always yields an empty portfolio (a cash position). The
/// `Send + Sync` bounds let the engine hold a scheme across await points.
pub trait WeightingScheme: Send + Sync {
    fn name(&self) -> &'static str;

    fn construct(&self, ranked: &[RankedInstrument]) -> Result<Portfolio, PortfolioError>;
}

fn collect_unique(
    ranked: &[RankedInstrument],
    weight_of: impl Fn(&RankedInstrument) -> f64,
) -> Result<BTreeMap<InstrumentId, f64>, PortfolioError> {
    let mut weights = BTreeMap::new();
    for r in ranked {
        if weights.insert(r.instrument.clone(), weight_of(r)).is_some() {
            return Err(PortfolioError::DuplicateInstrument(r.instrument.clone()));
        }
    }
    Ok(weights)
}

/// `1/N` for each of the `N` ranked instruments.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeight;

impl WeightingScheme for EqualWeight {
    fn name(&self) -> &'static str {
        "equal"
    }

    fn construct(&self, ranked: &[RankedInstrument]) -> Result<Portfolio, PortfolioError> {
        if ranked.is_empty() {
            return Ok(Portfolio::empty());
        }
        let w = 1.0 / ranked.len() as f64;
        Ok(Portfolio::from_weights(collect_unique(ranked, |_| w)?)?)
    }
}

/// Weights proportional to each instrument's positive composite score.
///
/// Non-positive scores get zero weight but stay in the portfolio. When no score
/// is positive the scheme falls back to equal weighting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreWeighted;

impl WeightingScheme for ScoreWeighted {
    fn name(&self) -> &'static str {
        "score_weighted"
    }

    fn construct(&self, ranked: &[RankedInstrument]) -> Result<Portfolio, PortfolioError> {
        let positive_total: f64 = ranked
            .iter()
            .map(|r| r.score)
            .filter(|s| s.is_finite() && *s > 0.0)
            .sum();

        if positive_total <= 0.0 {
            tracing::debug!("No positive scores; falling back to equal weights");
            return EqualWeight.construct(ranked);
        }

        let weights = collect_unique(ranked, |r| {
            if r.score.is_finite() && r.score > 0.0 {
                r.score / positive_total
            } else {
                0.0
            }
        })?;
        Ok(Portfolio::from_weights(weights)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core_types::WEIGHT_TOLERANCE;
    use proptest::prelude::*;

    fn ranked(scores: &[(&str, f64)]) -> Vec<RankedInstrument> {
        scores
            .iter()
            .map(|&(id, score)| RankedInstrument {
                instrument: id.to_string(),
                score,
            })
            .collect()
    }

    #[test]
    fn test_equal_weight() {
        let p = EqualWeight.construct(&ranked(&[("A", 3.0), ("B", 2.0), ("C", 1.0)])).unwrap();
        assert_eq!(p.len(), 3);
        assert_abs_diff_eq!(p.weight("B").unwrap(), 1.0 / 3.0, epsilon = 1e-15);
    }

    #[test]
    fn test_empty_list_is_cash() {
        assert!(EqualWeight.construct(&[]).unwrap().is_empty());
        assert!(ScoreWeighted.construct(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_score_weighted_proportional_to_positive_scores() {
        let p = ScoreWeighted
            .construct(&ranked(&[("A", 3.0), ("B", 1.0), ("C", -2.0)]))
            .unwrap();
        assert_abs_diff_eq!(p.weight("A").unwrap(), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(p.weight("B").unwrap(), 0.25, epsilon = 1e-12);
        assert_eq!(p.weight("C"), Some(0.0));
    }

    #[test]
    fn test_score_weighted_falls_back_to_equal() {
        let p = ScoreWeighted.construct(&ranked(&[("A", -1.0), ("B", -2.0)])).unwrap();
        assert_abs_diff_eq!(p.weight("A").unwrap(), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_duplicate_instrument_rejected() {
        let err = EqualWeight.construct(&ranked(&[("A", 1.0), ("A", 2.0)])).unwrap_err();
        assert_eq!(err, PortfolioError::DuplicateInstrument("A".to_string()));
    }

    proptest! {
        #[test]
        fn prop_weights_sum_to_one(scores in prop::collection::vec(-5.0f64..5.0, 1..60)) {
            let list: Vec<RankedInstrument> = scores
                .iter()
                .enumerate()
                .map(|(i, &score)| RankedInstrument { instrument: format!("I{:03}", i), score })
                .collect();

            for scheme in [&EqualWeight as &dyn WeightingScheme, &ScoreWeighted] {
                let p = scheme.construct(&list).unwrap();
                prop_assert!((p.total_weight() - 1.0).abs() <= WEIGHT_TOLERANCE);
                prop_assert!(p.weights().values().all(|w| *w >= 0.0));
            }
        }
    }
}
