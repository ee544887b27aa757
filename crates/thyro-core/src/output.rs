//! JSON file output.
//!
//! Everything thyro writes is a single pretty-printed UTF-8 JSON document.
//! Non-ASCII text (e.g. Chinese questions) is written literally.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Write `value` to `path` as pretty JSON, creating parent directories.
///
/// An existing file is overwritten.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value).map_err(io::Error::other)?;
    writeln!(writer)?;
    writer.flush()
}

/// Read back a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> PipelineResult<T> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Records {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| PipelineError::Records {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Re-read `path` and confirm it holds valid JSON.
pub fn verify_json_file(path: &Path) -> PipelineResult<()> {
    let verification = |message: String| PipelineError::Verification {
        path: path.to_path_buf(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| verification(e.to_string()))?;
    serde_json::from_str::<serde_json::Value>(&content)
        .map_err(|e| verification(e.to_string()))?;
    tracing::debug!("Verified JSON output at {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetGenerator, RecordFormat, TrainingRecord};
    use crate::label::LabelRule;
    use crate::prompts::PromptSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;

    #[test]
    fn test_non_ascii_written_literally() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json_pretty(&path, &vec!["甲状腺是否有病？"]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("甲状腺是否有病？"));
        assert!(!content.contains("\\u"));
        assert!(content.ends_with("]\n"));
    }

    #[test]
    fn test_records_round_trip() {
        let gen = DatasetGenerator::new(PromptSet::default(), LabelRule::default()).unwrap();
        let files: Vec<PathBuf> = (0..4)
            .map(|i| PathBuf::from(format!("d/A{i}-P0_1.png")))
            .chain((0..4).map(|i| PathBuf::from(format!("d/B{i}-P1_1.png"))))
            .collect();
        let mut rng = StdRng::seed_from_u64(4);

        let dir = tempfile::tempdir().unwrap();
        for format in [RecordFormat::Sft, RecordFormat::Dpo, RecordFormat::Legacy] {
            let dataset = gen.generate(&files, format, &mut rng);
            let path = dir.path().join(format.default_output_name());
            write_json_pretty(&path, &dataset.records).unwrap();

            let back: Vec<TrainingRecord> = read_json(&path).unwrap();
            assert_eq!(back, dataset.records);
        }
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.json");
        write_json_pretty(&path, &serde_json::json!({"ok": true})).unwrap();
        assert!(verify_json_file(&path).is_ok());
    }

    #[test]
    fn test_verify_rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"predictions\": [").unwrap();
        let err = verify_json_file(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Verification { .. }));
    }
}
