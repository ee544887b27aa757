//! Prompt text and question/answer vocabularies.
//!
//! A [`PromptSet`] is loaded once at startup and shared read-only by the
//! dataset generator and the evaluator. The built-in set covers Chinese and
//! English; an alternative set can be supplied as a TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::label::Label;

const SYSTEM_PROMPT: &str = r#"# Role: Thyroid Imaging Diagnostic Assistant
## Task:
Analyze thyroid lymph node ultrasound images to classify them as **"diseased"** or **"normal"**.
## Key Features to Analyze:
1. Shape: Round or oval
2. Aspect ratio < 2
3. Irregular morphology or confluence
4. Vascular flow signals
5. Poorly defined or absent hilum
6. Calcifications, cystic degeneration, or necrosis
7. Heterogeneous or hyperechoic internal echoes
## Rules:
- Focus only on thyroid lymph nodes.
- Be objective and consistent.
- Avoid diagnosing other organs or suggesting treatments.
## Output Format:
```json
{
"classification": "diseased or normal"
}
```"#;

const EVALUATION_QUESTION: &str = "Does the thyroid have any diseases?";

/// Answer vocabulary for one language, keyed by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPair {
    pub diseased: String,
    pub normal: String,
}

impl AnswerPair {
    pub fn for_label(&self, label: Label) -> &str {
        match label {
            Label::Diseased => &self.diseased,
            Label::Normal => &self.normal,
        }
    }
}

/// Questions and answers for a single response language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageTemplate {
    /// Short language code ("zh", "en", ...)
    pub code: String,
    pub questions: Vec<String>,
    pub answers: AnswerPair,
}

/// All fixed text used to build training records and inference requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSet {
    /// Diagnostic system prompt describing the task and output contract
    pub system: String,

    /// User question sent with every evaluation request
    pub evaluation_question: String,

    /// Response languages, chosen uniformly per record
    pub languages: Vec<LanguageTemplate>,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            evaluation_question: EVALUATION_QUESTION.to_string(),
            languages: vec![
                LanguageTemplate {
                    code: "zh".to_string(),
                    questions: vec![
                        "甲状腺是否有疾病？".to_string(),
                        "甲状腺是否存在病变？".to_string(),
                        "甲状腺是否有病？".to_string(),
                        "甲状腺功能是否正常？".to_string(),
                    ],
                    answers: AnswerPair {
                        diseased: "有病".to_string(),
                        normal: "没病".to_string(),
                    },
                },
                LanguageTemplate {
                    code: "en".to_string(),
                    questions: vec![
                        "Does the thyroid have any diseases?".to_string(),
                        "Are there any abnormalities in the thyroid?".to_string(),
                        "Is there a problem with the thyroid?".to_string(),
                        "Is the thyroid function normal?".to_string(),
                    ],
                    answers: AnswerPair {
                        diseased: "sick".to_string(),
                        normal: "not sick".to_string(),
                    },
                },
            ],
        }
    }
}

impl PromptSet {
    /// Load a prompt set from a TOML file. Missing keys fall back to the
    /// built-in values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let prompts: PromptSet = toml::from_str(&content)?;
        prompts.validate()?;
        tracing::debug!(
            "Loaded prompt set from {:?} ({} languages)",
            path,
            prompts.languages.len()
        );
        Ok(prompts)
    }

    /// Serialize the prompt set to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "prompts.system must not be empty".into(),
            ));
        }
        if self.languages.is_empty() {
            return Err(ConfigError::ValidationError(
                "prompts.languages must contain at least one language".into(),
            ));
        }
        if let Some(lang) = self.languages.iter().find(|l| l.questions.is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "prompts language '{}' has no questions",
                lang.code
            )));
        }
        Ok(())
    }
}
