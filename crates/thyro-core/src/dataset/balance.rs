//! Balanced dataset generation.
//!
//! Images are split by label, the majority class is downsampled to the size
//! of the minority class, and the combined selection is shuffled before one
//! record is built per image.

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;

use super::records::{
    ChatMessage, LegacyRecord, PreferenceRecord, RecordFormat, SftRecord, TrainingRecord, Turn,
};
use crate::error::ConfigError;
use crate::label::{Label, LabelRule};
use crate::output;
use crate::prompts::{LanguageTemplate, PromptSet};

/// Images split by derived label.
#[derive(Debug, Default, Clone)]
pub struct Partition {
    pub normal: Vec<PathBuf>,
    pub diseased: Vec<PathBuf>,
}

impl Partition {
    /// Size of the smaller class.
    pub fn min_count(&self) -> usize {
        self.normal.len().min(self.diseased.len())
    }
}

/// Split `files` into normal and diseased sets, preserving input order.
pub fn partition(files: &[PathBuf], rule: &LabelRule) -> Partition {
    let mut split = Partition::default();
    for file in files {
        match rule.classify(file) {
            Label::Normal => split.normal.push(file.clone()),
            Label::Diseased => split.diseased.push(file.clone()),
        }
    }
    split
}

/// Draw `min_count` images from each class without replacement and shuffle
/// the union.
pub fn balance<R: Rng + ?Sized>(split: &Partition, rng: &mut R) -> Vec<PathBuf> {
    let m = split.min_count();

    let mut selected: Vec<PathBuf> = split
        .normal
        .choose_multiple(rng, m)
        .cloned()
        .chain(split.diseased.choose_multiple(rng, m).cloned())
        .collect();
    selected.shuffle(rng);
    selected
}

/// Output of a generation run.
#[derive(Debug, Clone)]
pub struct BalancedDataset {
    pub records: Vec<TrainingRecord>,
    /// Number of images drawn from each class
    pub per_class: usize,
}

impl BalancedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the records as a pretty JSON array, overwriting `path`.
    pub fn write(&self, path: &Path) -> crate::Result<()> {
        output::write_json_pretty(path, &self.records)?;
        Ok(())
    }
}

/// Builds balanced training records from labeled images.
pub struct DatasetGenerator {
    prompts: PromptSet,
    rule: LabelRule,
}

impl DatasetGenerator {
    pub fn new(prompts: PromptSet, rule: LabelRule) -> Result<Self, ConfigError> {
        prompts.validate()?;
        Ok(Self { prompts, rule })
    }

    pub fn rule(&self) -> &LabelRule {
        &self.rule
    }

    /// Generate a balanced dataset from the given images.
    ///
    /// If either class is empty the result is empty.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        files: &[PathBuf],
        format: RecordFormat,
        rng: &mut R,
    ) -> BalancedDataset {
        let split = partition(files, &self.rule);
        tracing::info!(
            "Found {} normal and {} diseased images",
            split.normal.len(),
            split.diseased.len()
        );
        if split.min_count() == 0 {
            tracing::warn!("One class has no images, generated dataset will be empty");
        }

        let records = balance(&split, rng)
            .iter()
            .map(|path| self.build_record(path, format, rng))
            .collect();

        BalancedDataset {
            records,
            per_class: split.min_count(),
        }
    }

    /// Build a single record for `path` with a randomly chosen language and
    /// question.
    pub fn build_record<R: Rng + ?Sized>(
        &self,
        path: &Path,
        format: RecordFormat,
        rng: &mut R,
    ) -> TrainingRecord {
        let label = self.rule.classify(path);
        let lang = self.pick_language(rng);
        let question = &lang.questions[rng.gen_range(0..lang.questions.len())];
        let prompt = format!("<image>{question}");
        let image = path.to_string_lossy().into_owned();

        match format {
            RecordFormat::Sft => TrainingRecord::Sft(SftRecord {
                conversations: vec![
                    Turn::new("human", prompt),
                    Turn::new("gpt", lang.answers.for_label(label)),
                ],
                images: vec![image],
                system: self.prompts.system.clone(),
            }),
            RecordFormat::Dpo => TrainingRecord::Preference(PreferenceRecord {
                conversations: vec![
                    Turn::new("system", self.prompts.system.clone()),
                    Turn::new("human", prompt),
                ],
                chosen: Turn::new("gpt", lang.answers.for_label(label)),
                rejected: Turn::new("gpt", lang.answers.for_label(label.opposite())),
                images: vec![image],
            }),
            RecordFormat::Legacy => TrainingRecord::Legacy(LegacyRecord {
                messages: vec![
                    ChatMessage {
                        content: prompt,
                        role: "user".to_string(),
                    },
                    ChatMessage {
                        content: lang.answers.for_label(label).to_string(),
                        role: "assistant".to_string(),
                    },
                ],
                images: vec![image],
            }),
        }
    }

    /// Count `(normal, diseased)` records by re-deriving labels from their
    /// image paths.
    pub fn class_counts(&self, records: &[TrainingRecord]) -> (usize, usize) {
        records
            .iter()
            .filter_map(|r| r.image())
            .fold((0, 0), |(normal, diseased), image| {
                match self.rule.classify(Path::new(image)) {
                    Label::Normal => (normal + 1, diseased),
                    Label::Diseased => (normal, diseased + 1),
                }
            })
    }

    // Languages are non-empty: `new` validates the prompt set.
    fn pick_language<R: Rng + ?Sized>(&self, rng: &mut R) -> &LanguageTemplate {
        let langs = &self.prompts.languages;
        &langs[rng.gen_range(0..langs.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn generator() -> DatasetGenerator {
        DatasetGenerator::new(PromptSet::default(), LabelRule::default()).unwrap()
    }

    fn files(normal: usize, diseased: usize) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for i in 0..normal {
            files.push(PathBuf::from(format!("imgs/A{i}-P0_1.png")));
        }
        for i in 0..diseased {
            files.push(PathBuf::from(format!("imgs/B{i}-P2_1.png")));
        }
        files
    }

    #[test]
    fn test_partition() {
        let split = partition(&files(3, 7), &LabelRule::default());
        assert_eq!(split.normal.len(), 3);
        assert_eq!(split.diseased.len(), 7);
        assert_eq!(split.min_count(), 3);
    }

    #[test]
    fn test_three_normal_seven_diseased_gives_six() {
        let gen = generator();
        let mut rng = StdRng::seed_from_u64(7);
        let dataset = gen.generate(&files(3, 7), RecordFormat::Sft, &mut rng);

        assert_eq!(dataset.per_class, 3);
        assert_eq!(dataset.len(), 6);
        assert_eq!(gen.class_counts(&dataset.records), (3, 3));
    }

    #[test]
    fn test_balanced_for_many_shapes() {
        let gen = generator();
        let mut rng = StdRng::seed_from_u64(42);
        for (n, d) in [(1, 9), (10, 4), (5, 5), (12, 13)] {
            for format in [RecordFormat::Sft, RecordFormat::Dpo, RecordFormat::Legacy] {
                let dataset = gen.generate(&files(n, d), format, &mut rng);
                let (normal, diseased) = gen.class_counts(&dataset.records);
                assert_eq!(normal, diseased);
                assert_eq!(dataset.len(), 2 * n.min(d));
            }
        }
    }

    #[test]
    fn test_sampling_without_replacement() {
        let gen = generator();
        let mut rng = StdRng::seed_from_u64(3);
        let dataset = gen.generate(&files(20, 20), RecordFormat::Sft, &mut rng);
        let unique: HashSet<_> = dataset.records.iter().filter_map(|r| r.image()).collect();
        assert_eq!(unique.len(), 40);
    }

    #[test]
    fn test_empty_class_gives_empty_dataset() {
        let gen = generator();
        let mut rng = StdRng::seed_from_u64(1);
        let dataset = gen.generate(&files(0, 5), RecordFormat::Dpo, &mut rng);
        assert!(dataset.is_empty());
        assert_eq!(dataset.per_class, 0);
    }

    #[test]
    fn test_same_seed_same_dataset() {
        let gen = generator();
        let a = gen.generate(&files(6, 8), RecordFormat::Sft, &mut StdRng::seed_from_u64(9));
        let b = gen.generate(&files(6, 8), RecordFormat::Sft, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn test_sft_record_answer_matches_label() {
        let gen = generator();
        let prompts = PromptSet::default();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            let record = gen.build_record(Path::new("x/C1-P0_2.png"), RecordFormat::Sft, &mut rng);
            let TrainingRecord::Sft(sft) = record else {
                panic!("expected sft record");
            };
            assert_eq!(sft.system, prompts.system);
            assert_eq!(sft.conversations[0].from, "human");
            assert!(sft.conversations[0].value.starts_with("<image>"));
            let answer = &sft.conversations[1].value;
            assert!(prompts
                .languages
                .iter()
                .any(|l| &l.answers.normal == answer));
        }
    }

    #[test]
    fn test_preference_record_rejects_opposite() {
        let gen = generator();
        let mut rng = StdRng::seed_from_u64(5);
        let record = gen.build_record(Path::new("x/D3-P1_2.png"), RecordFormat::Dpo, &mut rng);
        let TrainingRecord::Preference(pref) = record else {
            panic!("expected preference record");
        };
        assert!(["sick", "有病"].contains(&pref.chosen.value.as_str()));
        assert!(["not sick", "没病"].contains(&pref.rejected.value.as_str()));
        assert_eq!(pref.conversations[0].from, "system");
    }

    #[test]
    fn test_legacy_record_roles() {
        let gen = generator();
        let mut rng = StdRng::seed_from_u64(2);
        let record = gen.build_record(Path::new("x/E1-P0_1.png"), RecordFormat::Legacy, &mut rng);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][1]["role"], "assistant");
        assert_eq!(value["images"][0], "x/E1-P0_1.png");
    }
}
