use crate::weighting::{EqualWeight, ScoreWeighted, WeightingScheme};
use core_types::WeightingKind;

/// Creates the weighting scheme selected in configuration.
pub fn create_weighting(kind: WeightingKind) -> Box<dyn WeightingScheme> {
    match kind {
        WeightingKind::Equal => Box::new(EqualWeight),
        WeightingKind::ScoreWeighted => Box::new(ScoreWeighted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_names() {
        assert_eq!(create_weighting(WeightingKind::Equal).name(), "equal");
        assert_eq!(create_weighting(WeightingKind::ScoreWeighted).name(), "score_weighted");
    }
}
