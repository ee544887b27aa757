//! Scoring of evaluation predictions.
//!
//! Implements the metrics reported after an evaluation run:
//! - 2x2 confusion matrix over `[normal, diseased]` (rows = truth, columns = prediction)
//! - per-class precision, recall, F1 and support
//! - accuracy plus macro and support-weighted averages
//!
//! Zero denominators yield 0.0 rather than NaN.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PipelineError;
use crate::evaluate::Prediction;
use crate::label::Label;

/// Extract the predicted label from a raw model response.
///
/// Accepts the bare JSON object or one wrapped in a markdown code fence.
pub fn parse_classification(text: &str) -> Result<Label, PipelineError> {
    let body = strip_code_fence(text.trim());
    let value: Value = serde_json::from_str(body)
        .map_err(|e| PipelineError::Classification(format!("not JSON: {e}")))?;

    let class = value
        .get("classification")
        .and_then(Value::as_str)
        .ok_or_else(|| PipelineError::Classification("missing `classification` field".into()))?;

    Label::parse(class)
        .ok_or_else(|| PipelineError::Classification(format!("unknown class '{class}'")))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string ("json") on the opening fence line; a one-line
    // fence has none.
    match rest.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => rest.trim(),
    }
}

/// Confusion matrix indexed by [`Label::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfusionMatrix([[usize; 2]; 2]);

impl ConfusionMatrix {
    /// Build from `(truth, prediction)` pairs.
    pub fn from_pairs(pairs: &[(Label, Label)]) -> Self {
        let mut cells = [[0usize; 2]; 2];
        for (truth, pred) in pairs {
            cells[truth.index()][pred.index()] += 1;
        }
        Self(cells)
    }

    pub fn get(&self, truth: Label, pred: Label) -> usize {
        self.0[truth.index()][pred.index()]
    }

    pub fn rows(&self) -> &[[usize; 2]; 2] {
        &self.0
    }

    /// Total number of scored samples.
    pub fn total(&self) -> usize {
        self.0.iter().flatten().sum()
    }

    /// Number of samples whose true label is `label`.
    pub fn support(&self, label: Label) -> usize {
        self.0[label.index()].iter().sum()
    }

    /// Number of samples predicted as `label`.
    pub fn predicted(&self, label: Label) -> usize {
        self.0.iter().map(|row| row[label.index()]).sum()
    }

    pub fn correct(&self) -> usize {
        Label::ORDER.iter().map(|l| self.get(*l, *l)).sum()
    }
}

/// Precision, recall and F1 for one class (or an average).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn for_label(cm: &ConfusionMatrix, label: Label) -> Self {
        let tp = cm.get(label, label);
        let precision = ratio(tp, cm.predicted(label));
        let recall = ratio(tp, cm.support(label));
        Self {
            precision,
            recall,
            f1_score: f1(precision, recall),
            support: cm.support(label),
        }
    }
}

/// Per-class report in the layout of scikit-learn's `output_dict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub normal: ClassMetrics,
    pub diseased: ClassMetrics,
    pub accuracy: f64,
    #[serde(rename = "macro avg")]
    pub macro_avg: ClassMetrics,
    #[serde(rename = "weighted avg")]
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let normal = ClassMetrics::for_label(cm, Label::Normal);
        let diseased = ClassMetrics::for_label(cm, Label::Diseased);
        let total = cm.total();

        let macro_avg = ClassMetrics {
            precision: (normal.precision + diseased.precision) / 2.0,
            recall: (normal.recall + diseased.recall) / 2.0,
            f1_score: (normal.f1_score + diseased.f1_score) / 2.0,
            support: total,
        };

        let weight = |n: f64, d: f64| {
            if total == 0 {
                0.0
            } else {
                (n * normal.support as f64 + d * diseased.support as f64) / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weight(normal.precision, diseased.precision),
            recall: weight(normal.recall, diseased.recall),
            f1_score: weight(normal.f1_score, diseased.f1_score),
            support: total,
        };

        Self {
            normal,
            diseased,
            accuracy: ratio(cm.correct(), total),
            macro_avg,
            weighted_avg,
        }
    }

    pub fn class(&self, label: Label) -> &ClassMetrics {
        match label {
            Label::Normal => &self.normal,
            Label::Diseased => &self.diseased,
        }
    }
}

/// Everything computed from one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub confusion_matrix: ConfusionMatrix,
    pub classification_report: ClassificationReport,
    /// Successful predictions with a parseable classification
    pub total_samples: usize,
}

impl Metrics {
    /// Score successful predictions. Responses that don't parse are logged
    /// and left out.
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        let pairs: Vec<(Label, Label)> = predictions
            .iter()
            .filter(|p| p.success)
            .filter_map(|p| match parse_classification(&p.model_response) {
                Ok(pred) => Some((p.true_label, pred)),
                Err(e) => {
                    tracing::warn!("Error parsing response for {}: {e}", p.image_path);
                    None
                }
            })
            .collect();

        let confusion_matrix = ConfusionMatrix::from_pairs(&pairs);
        Self {
            classification_report: ClassificationReport::from_confusion_matrix(&confusion_matrix),
            total_samples: confusion_matrix.total(),
            confusion_matrix,
        }
    }

    /// Human-readable summary printed after a run.
    pub fn summary(&self) -> String {
        let cm = &self.confusion_matrix;
        let mut out = String::new();
        out.push_str("=== Evaluation Metrics ===\n\nConfusion Matrix:\n");
        out.push_str("                 Predicted Normal  Predicted Diseased\n");
        for truth in Label::ORDER {
            out.push_str(&format!(
                "True {:<12}{:>16}{:>20}\n",
                capitalize(truth.as_str()),
                cm.get(truth, Label::Normal),
                cm.get(truth, Label::Diseased)
            ));
        }

        out.push_str("\nClassification Report:\n");
        for label in Label::ORDER {
            let m = self.classification_report.class(label);
            out.push_str(&format!(
                "\n{}:\nPrecision: {:.3}\nRecall: {:.3}\nF1-score: {:.3}\n",
                capitalize(label.as_str()),
                m.precision,
                m.recall,
                m.f1_score
            ));
        }
        out.push_str(&format!(
            "\nAccuracy: {:.3}\nTotal samples: {}\n",
            self.classification_report.accuracy, self.total_samples
        ));
        out
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    let denom = precision + recall;
    if denom == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / denom
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(path: &str, truth: Label, response: &str, success: bool) -> Prediction {
        Prediction {
            image_path: path.to_string(),
            true_label: truth,
            model_response: response.to_string(),
            success,
        }
    }

    #[test]
    fn test_parse_classification_variants() {
        assert_eq!(
            parse_classification(r#"{"classification": "normal"}"#).unwrap(),
            Label::Normal
        );
        assert_eq!(
            parse_classification("```json\n{\"classification\": \"Diseased\"}\n```").unwrap(),
            Label::Diseased
        );
        assert_eq!(
            parse_classification(r#"```{"classification":"normal"}```"#).unwrap(),
            Label::Normal
        );
        assert!(parse_classification("The thyroid looks fine").is_err());
        assert!(parse_classification(r#"{"label": "normal"}"#).is_err());
        assert!(parse_classification(r#"{"classification": "sick"}"#).is_err());
    }

    #[test]
    fn test_confusion_matrix_layout() {
        let cm = ConfusionMatrix::from_pairs(&[
            (Label::Normal, Label::Normal),
            (Label::Normal, Label::Diseased),
            (Label::Diseased, Label::Diseased),
            (Label::Diseased, Label::Diseased),
        ]);
        assert_eq!(cm.rows(), &[[1, 1], [0, 2]]);
        assert_eq!(serde_json::to_string(&cm).unwrap(), "[[1,1],[0,2]]");
        assert_eq!(cm.total(), 4);
    }

    #[test]
    fn test_report_values() {
        // truth normal: 3 correct, 1 wrong; truth diseased: 2 wrong, 4 correct
        let mut pairs = vec![(Label::Normal, Label::Normal); 3];
        pairs.push((Label::Normal, Label::Diseased));
        pairs.extend(vec![(Label::Diseased, Label::Normal); 2]);
        pairs.extend(vec![(Label::Diseased, Label::Diseased); 4]);
        let cm = ConfusionMatrix::from_pairs(&pairs);
        let report = ClassificationReport::from_confusion_matrix(&cm);

        assert!((report.normal.precision - 3.0 / 5.0).abs() < 1e-9);
        assert!((report.normal.recall - 3.0 / 4.0).abs() < 1e-9);
        assert!((report.diseased.precision - 4.0 / 5.0).abs() < 1e-9);
        assert!((report.diseased.recall - 4.0 / 6.0).abs() < 1e-9);
        assert!((report.accuracy - 0.7).abs() < 1e-9);
        assert_eq!(report.normal.support, 4);
        assert_eq!(report.weighted_avg.support, 10);

        let expected_f1 = 2.0 * 0.6 * 0.75 / (0.6 + 0.75);
        assert!((report.normal.f1_score - expected_f1).abs() < 1e-9);
    }

    #[test]
    fn test_report_serializes_sklearn_keys() {
        let report = ClassificationReport::from_confusion_matrix(&ConfusionMatrix::default());
        let value = serde_json::to_value(report).unwrap();
        assert!(value["normal"].get("f1-score").is_some());
        assert!(value.get("macro avg").is_some());
        assert!(value.get("weighted avg").is_some());
        assert_eq!(value["accuracy"], 0.0);
    }

    #[test]
    fn test_one_scored_sample_of_two() {
        let predictions = vec![
            prediction("a-P0_1.png", Label::Normal, r#"{"classification": "normal"}"#, true),
            prediction("b-P3_1.png", Label::Diseased, "I cannot tell.", true),
        ];
        let metrics = Metrics::from_predictions(&predictions);
        assert_eq!(metrics.total_samples, 1);
        assert_eq!(metrics.confusion_matrix.rows(), &[[1, 0], [0, 0]]);
        assert_eq!(metrics.classification_report.accuracy, 1.0);
    }

    #[test]
    fn test_failed_predictions_not_scored() {
        let predictions = vec![
            prediction("a-P0_1.png", Label::Normal, "Error: connection refused", false),
            prediction("b-P3_1.png", Label::Diseased, r#"{"classification":"diseased"}"#, true),
        ];
        let metrics = Metrics::from_predictions(&predictions);
        assert_eq!(metrics.total_samples, 1);
        assert_eq!(metrics.confusion_matrix.total(), metrics.total_samples);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let predictions = vec![prediction(
            "a-P0_1.png",
            Label::Normal,
            r#"{"classification": "diseased"}"#,
            true,
        )];
        let summary = Metrics::from_predictions(&predictions).summary();
        assert!(summary.contains("True Normal"));
        assert!(summary.contains("Accuracy: 0.000"));
        assert!(summary.contains("Total samples: 1"));
    }
}
