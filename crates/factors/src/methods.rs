use crate::scorer::{FactorKind, Lookback};
use core_types::RankingMethod;

/// The factor kinds averaged by `method`.
///
/// Adding a ranking method means adding a `RankingMethod` variant and one arm
/// here; the compiler flags any method left unmapped.
pub fn factors_for(method: RankingMethod) -> Vec<FactorKind> {
    match method {
        RankingMethod::AvgZScore12_6_3 => vec![
            FactorKind::ZScore(Lookback::Months12),
            FactorKind::ZScore(Lookback::Months6),
            FactorKind::ZScore(Lookback::Months3),
        ],
        RankingMethod::AvgSharpe12_6_3 => vec![
            FactorKind::Sharpe(Lookback::Months12),
            FactorKind::Sharpe(Lookback::Months6),
            FactorKind::Sharpe(Lookback::Months3),
        ],
        RankingMethod::AvgSharpe9_6_3 => vec![
            FactorKind::Sharpe(Lookback::Months9),
            FactorKind::Sharpe(Lookback::Months6),
            FactorKind::Sharpe(Lookback::Months3),
        ],
    }
}

/// The longest window `method` needs, in trading days.
pub fn max_lookback_days(method: RankingMethod) -> usize {
    factors_for(method)
        .iter()
        .map(|k| k.lookback().trading_days())
        .max()
        .unwrap_or(0)
}
