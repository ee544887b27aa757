//! Ground-truth labels derived from file names.
//!
//! Both the dataset generator and the evaluator go through [`LabelRule`], so a
//! file is always assigned the same class no matter which pipeline reads it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::config::LabelConfig;

/// Binary diagnostic class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Normal,
    Diseased,
}

impl Label {
    /// Fixed class ordering used for confusion matrix axes and reports.
    pub const ORDER: [Label; 2] = [Label::Normal, Label::Diseased];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Normal => "normal",
            Label::Diseased => "diseased",
        }
    }

    /// Parse a class name, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(Label::Normal),
            "diseased" => Some(Label::Diseased),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Label::Normal => Label::Diseased,
            Label::Diseased => Label::Normal,
        }
    }

    /// Index into [`Label::ORDER`].
    pub fn index(&self) -> usize {
        match self {
            Label::Normal => 0,
            Label::Diseased => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-substring rule mapping an image path to a [`Label`].
///
/// The marker is searched for in the file name only; a marker hit means the
/// image is normal, a miss means diseased.
#[derive(Debug, Clone)]
pub struct LabelRule {
    marker: String,
    case_sensitive: bool,
}

impl LabelRule {
    pub fn new(marker: &str, case_sensitive: bool) -> Self {
        let marker = if case_sensitive {
            marker.to_string()
        } else {
            marker.to_lowercase()
        };
        Self {
            marker,
            case_sensitive,
        }
    }

    pub fn from_config(config: &LabelConfig) -> Self {
        Self::new(&config.marker, config.case_sensitive)
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Derive the label of an image from its path.
    pub fn classify(&self, path: &Path) -> Label {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        let hit = if self.case_sensitive {
            name.contains(self.marker.as_str())
        } else {
            name.to_lowercase().contains(self.marker.as_str())
        };

        if hit {
            Label::Normal
        } else {
            Label::Diseased
        }
    }
}

impl Default for LabelRule {
    fn default() -> Self {
        Self::from_config(&LabelConfig::default())
    }
}
