//! Re-balancing of an existing record file.
//!
//! Works on arbitrary JSON objects carrying an `output` string whose content
//! is a `{"classification": ...}` document, e.g. records distilled from
//! earlier model runs.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

use crate::label::Label;
use crate::metrics::parse_classification;

/// Before/after class counts of a re-balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RebalanceStats {
    pub normal_before: usize,
    pub diseased_before: usize,
    pub skipped: usize,
    pub per_class: usize,
}

/// Downsample the majority class of `items` and shuffle the result.
///
/// Any classification other than `normal` counts as diseased. Items without
/// a parseable `output` are dropped.
pub fn rebalance_records<R: Rng + ?Sized>(
    items: Vec<Value>,
    rng: &mut R,
) -> (Vec<Value>, RebalanceStats) {
    let mut normal = Vec::new();
    let mut diseased = Vec::new();
    let mut skipped = 0;

    for (i, item) in items.into_iter().enumerate() {
        match record_label(&item) {
            Some(Label::Normal) => normal.push(item),
            Some(Label::Diseased) => diseased.push(item),
            None => {
                tracing::warn!("Skipping record {i}: no parseable `output` classification");
                skipped += 1;
            }
        }
    }

    let per_class = normal.len().min(diseased.len());
    let stats = RebalanceStats {
        normal_before: normal.len(),
        diseased_before: diseased.len(),
        skipped,
        per_class,
    };

    normal.shuffle(rng);
    diseased.shuffle(rng);
    normal.truncate(per_class);
    diseased.truncate(per_class);

    let mut balanced = normal;
    balanced.append(&mut diseased);
    balanced.shuffle(rng);

    (balanced, stats)
}

fn record_label(item: &Value) -> Option<Label> {
    let output = item.get("output")?.as_str()?;
    match parse_classification(output) {
        Ok(label) => Some(label),
        // Unknown class names still parse as a classification; they are not normal.
        Err(_) => {
            let value: Value = serde_json::from_str(output.trim()).ok()?;
            value.get("classification")?.as_str()?;
            Some(Label::Diseased)
        }
    }
}
