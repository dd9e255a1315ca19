use crate::error::FactorError;
use crate::methods::factors_for;
use crate::scorer::{self, FactorKind, FactorScore};
use chrono::NaiveDate;
use core_types::{InstrumentId, RankedInstrument, RankingMethod, ReturnSeries};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Composite scores for every instrument evaluated on one date.
#[derive(Debug, Clone, Serialize)]
pub struct RankedUniverse {
    pub evaluation_date: NaiveDate,
    /// Instruments with a defined composite, best first (ties by id ascending).
    pub ordered: Vec<RankedInstrument>,
    /// Instruments whose factors were all undefined.
    pub excluded: Vec<InstrumentId>,
}

impl RankedUniverse {
    /// The first `n` instruments of the ordering.
    pub fn top(&self, n: usize) -> Vec<RankedInstrument> {
        self.ordered.iter().take(n).cloned().collect()
    }

    pub fn score_of(&self, instrument: &str) -> Option<f64> {
        self.ordered
            .iter()
            .find(|r| r.instrument == instrument)
            .map(|r| r.score)
    }
}

/// Ranks a universe by the composite score named by a [`RankingMethod`].
#[derive(Debug, Clone)]
pub struct Ranker {
    method: RankingMethod,
    kinds: Vec<FactorKind>,
}

impl Ranker {
    pub fn new(method: RankingMethod) -> Self {
        Self {
            method,
            kinds: factors_for(method),
        }
    }

    pub fn method(&self) -> RankingMethod {
        self.method
    }

    /// The individual factor scores of one instrument, using returns dated strictly
    /// before `evaluation_date`.
    pub fn factor_scores(&self, evaluation_date: NaiveDate, history: &ReturnSeries) -> Vec<FactorScore> {
        let values: Vec<f64> = history
            .before(evaluation_date)
            .iter()
            .map(|p| p.value)
            .collect();
        scorer::score(&values, &self.kinds)
    }

    /// Scores every instrument in `histories` and orders them.
    ///
    /// Scoring runs in parallel across instruments. Fails with
    /// `InsufficientUniverse` if no instrument ends up with a defined composite.
    pub fn rank_universe(
        &self,
        evaluation_date: NaiveDate,
        histories: &BTreeMap<InstrumentId, ReturnSeries>,
    ) -> Result<RankedUniverse, FactorError> {
        let composites: Vec<(InstrumentId, Option<f64>)> = histories
            .par_iter()
            .map(|(id, history)| {
                let scores = self.factor_scores(evaluation_date, history);
                (id.clone(), scorer::composite(&scores))
            })
            .collect();

        let mut ordered = Vec::new();
        let mut excluded = Vec::new();
        for (instrument, composite) in composites {
            match composite.filter(|v| v.is_finite()) {
                Some(score) => ordered.push(RankedInstrument { instrument, score }),
                None => excluded.push(instrument),
            }
        }

        if ordered.is_empty() {
            return Err(FactorError::InsufficientUniverse(evaluation_date));
        }

        ordered.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.instrument.cmp(&b.instrument))
        });
        excluded.sort();

        tracing::debug!(
            date = %evaluation_date,
            method = %self.method,
            ranked = ordered.len(),
            excluded = excluded.len(),
            "Universe ranked"
        );

        Ok(RankedUniverse {
            evaluation_date,
            ordered,
            excluded,
        })
    }

    /// The top `top_n` instruments on `evaluation_date`.
    pub fn rank(
        &self,
        evaluation_date: NaiveDate,
        histories: &BTreeMap<InstrumentId, ReturnSeries>,
        top_n: usize,
    ) -> Result<Vec<RankedInstrument>, FactorError> {
        Ok(self.rank_universe(evaluation_date, histories)?.top(top_n))
    }
}
