use serde::Serialize;
use thiserror::Error;

use super::labels::LabelList;

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("Classifier returned an empty score vector")]
    EmptyScores,
}

/// One classified emotion with its probability.
///
/// Lives for a single frame cycle; the pipeline publishes a copy and drops
/// the rest with the cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

/// Maps raw classifier scores to the most likely emotion label.
pub struct ScoreInterpreter {
    labels: LabelList,
}

impl ScoreInterpreter {
    pub fn new(labels: LabelList) -> Self {
        Self { labels }
    }

    /// Softmax the score vector and return the winning class.
    ///
    /// A score vector longer than the label list is absorbed by the
    /// synthetic-label fallback rather than treated as an error; killing the
    /// live loop over a label mismatch is worse than an odd name.
    pub fn interpret(&self, scores: &[f32]) -> Result<Classification, InterpretError> {
        if scores.is_empty() {
            return Err(InterpretError::EmptyScores);
        }
        let probs = softmax(scores);
        let index = argmax(&probs).ok_or(InterpretError::EmptyScores)?;
        Ok(Classification {
            label: self.labels.label_for(index),
            confidence: probs[index],
        })
    }
}

/// Numerically stable softmax: the maximum score is subtracted before
/// exponentiating so large raw logits cannot overflow to infinity.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

/// Index of the largest entry, first occurrence winning ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, top)) if v <= top => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn emotion_labels() -> LabelList {
        LabelList::new(vec!["happy".into(), "sad".into(), "neutral".into()])
    }

    // ── softmax ──────────────────────────────────────────────────────────

    #[test]
    fn test_softmax_reference_distribution() {
        let probs = softmax(&[2.0, 1.0, 0.1]);
        assert_relative_eq!(probs[0], 0.659, epsilon = 1e-3);
        assert_relative_eq!(probs[1], 0.242, epsilon = 1e-3);
        assert_relative_eq!(probs[2], 0.099, epsilon = 1e-3);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[3.5, -1.2, 0.0, 7.9]);
        let sum: f32 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
        assert!(probs.iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn test_softmax_survives_huge_scores() {
        // Naive exp(1001) overflows; max subtraction must keep this finite.
        let probs = softmax(&[1000.0, 1001.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[1] > probs[0]);
        assert_relative_eq!(probs.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_uniform_scores_are_uniform() {
        let probs = softmax(&[0.5, 0.5, 0.5, 0.5]);
        for p in probs {
            assert_relative_eq!(p, 0.25, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let base = softmax(&[2.0, 1.0, 0.1]);
        let shifted = softmax(&[102.0, 101.0, 100.1]);
        for (a, b) in base.iter().zip(&shifted) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
    }

    // ── argmax ───────────────────────────────────────────────────────────

    #[test]
    fn test_argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
    }

    #[test]
    fn test_argmax_tie_keeps_first() {
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), Some(0));
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
    }

    #[test]
    fn test_argmax_empty_is_none() {
        assert_eq!(argmax(&[]), None);
    }

    // ── interpret ────────────────────────────────────────────────────────

    #[test]
    fn test_interpret_reference_scenario() {
        let interpreter = ScoreInterpreter::new(emotion_labels());
        let result = interpreter.interpret(&[2.0, 1.0, 0.1]).unwrap();
        assert_eq!(result.label, "happy");
        assert_relative_eq!(result.confidence, 0.659, epsilon = 1e-3);
    }

    #[test]
    fn test_interpret_empty_scores_fails() {
        let interpreter = ScoreInterpreter::new(emotion_labels());
        assert!(matches!(
            interpreter.interpret(&[]),
            Err(InterpretError::EmptyScores)
        ));
    }

    #[test]
    fn test_interpret_short_label_list_falls_back() {
        let interpreter = ScoreInterpreter::new(LabelList::new(vec!["happy".into()]));
        let result = interpreter.interpret(&[0.1, 0.2, 5.0]).unwrap();
        assert_eq!(result.label, "class_2");
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn test_classification_serializes_for_reporting() {
        let result = Classification {
            label: "happy".into(),
            confidence: 0.75,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"label":"happy","confidence":0.75}"#);
    }
}
