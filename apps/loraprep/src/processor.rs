//! # File Data Processor
//!
//! The real [`DataProcessor`]: reads a user file and writes MLX-LM training
//! entries as JSONL (`{"prompt": ..., "completion": ...}` per line).
//!
//! ## Structured Input
//!
//! - `.txt`: one `Question: ... || Answer: ...` pair per line
//! - `.csv`: `question,answer` rows; a header row is skipped
//! - `.json`: an array of objects with a question-like and an answer-like key
//!
//! ## Book Input
//!
//! Plain text is split into paragraphs on blank lines. Each paragraph is the
//! prompt and the paragraph after it the completion.

use loraprep_core::{DataMethod, DataProcessor, ProcessedDataResult, SourceFileRef, WizardError};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the generated training file.
pub const OUTPUT_FILE_NAME: &str = "train_data.jsonl";

/// Paragraphs shorter than this many characters are dropped as headings or noise.
const MIN_PARAGRAPH_CHARS: usize = 40;

const QUESTION_KEYS: &[&str] = &["question", "prompt", "instruction", "input"];
const ANSWER_KEYS: &[&str] = &["answer", "completion", "output", "response"];

/// One training entry in MLX-LM completion format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingEntry {
    pub prompt: String,
    pub completion: String,
}

impl TrainingEntry {
    fn new(prompt: impl Into<String>, completion: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            completion: completion.into(),
        }
    }
}

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Canonicalize `path` and ensure it names a regular file.
///
/// The path comes from the user, so every failure here is `InvalidData`.
fn validate_file_path(path: &Path) -> Result<PathBuf, WizardError> {
    let canonical = path.canonicalize().map_err(|e| {
        WizardError::InvalidData(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(WizardError::InvalidData(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

fn validate_file_size(path: &Path, max_size: u64) -> Result<(), WizardError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| WizardError::InvalidData(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(WizardError::InvalidData(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Lowercased extension of `path`, checked against the method's formats.
fn validate_extension(path: &Path, method: DataMethod) -> Result<String, WizardError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if method.accepted_extensions().contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(WizardError::InvalidData(format!(
            "{} accepts .{} files, got '{}'",
            method.title(),
            method.accepted_extensions().join(", ."),
            path.display()
        )))
    }
}

// =============================================================================
// PARSERS
// =============================================================================

/// Parse `Question: ... || Answer: ...` lines. Other lines are skipped.
pub fn parse_qa_text(content: &str) -> Vec<TrainingEntry> {
    content
        .lines()
        .filter_map(|line| {
            let (q, a) = line.split_once("||")?;
            let q = strip_label(q.trim(), "Question:");
            let a = strip_label(a.trim(), "Answer:");
            (!q.is_empty() && !a.is_empty()).then(|| TrainingEntry::new(q, a))
        })
        .collect()
}

fn strip_label<'a>(s: &'a str, label: &str) -> &'a str {
    s.strip_prefix(label).unwrap_or(s).trim()
}

/// Parse `question,answer` rows.
///
/// Only the first comma splits, so answers may contain commas. Surrounding
/// double quotes are removed. A first row of `question,answer` is a header.
pub fn parse_qa_csv(content: &str) -> Vec<TrainingEntry> {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let (q, a) = line.split_once(',')?;
            let q = unquote(q);
            let a = unquote(a);
            if i == 0 && q.eq_ignore_ascii_case("question") {
                return None;
            }
            (!q.is_empty() && !a.is_empty()).then(|| TrainingEntry::new(q, a))
        })
        .collect()
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
        .trim()
}

/// Parse a JSON array of question/answer objects.
pub fn parse_qa_json(content: &str) -> Result<Vec<TrainingEntry>, WizardError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| WizardError::InvalidData(format!("Invalid JSON: {}", e)))?;

    let items = value
        .as_array()
        .ok_or_else(|| WizardError::InvalidData("Expected a JSON array of objects".to_string()))?;

    Ok(items
        .iter()
        .filter_map(|item| {
            let q = first_string(item, QUESTION_KEYS)?;
            let a = first_string(item, ANSWER_KEYS)?;
            Some(TrainingEntry::new(q, a))
        })
        .collect())
}

fn first_string<'a>(item: &'a serde_json::Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| item.get(*k).and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Generate continuation pairs from consecutive paragraphs.
pub fn parse_book(content: &str) -> Vec<TrainingEntry> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs.retain(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS);

    paragraphs
        .windows(2)
        .map(|pair| {
            TrainingEntry::new(
                format!("Continue the passage:\n{}", pair[0]),
                pair[1].clone(),
            )
        })
        .collect()
}

// =============================================================================
// FILE DATA PROCESSOR
// =============================================================================

/// Data processor that reads from and writes to the local filesystem.
#[derive(Debug, Clone)]
pub struct FileDataProcessor {
    output_dir: PathBuf,
    max_file_bytes: u64,
}

impl FileDataProcessor {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, max_file_bytes: u64) -> Self {
        Self {
            output_dir: output_dir.into(),
            max_file_bytes,
        }
    }

    /// Path the JSONL file is written to.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_FILE_NAME)
    }

    fn write_entries(&self, entries: &[TrainingEntry]) -> Result<PathBuf, WizardError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            WizardError::IoError(format!(
                "Cannot create output directory '{}': {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let path = self.output_path();
        let file = std::fs::File::create(&path)
            .map_err(|e| WizardError::IoError(format!("Cannot create output file: {}", e)))?;
        let mut writer = std::io::BufWriter::new(file);

        for entry in entries {
            let line = serde_json::to_string(entry)
                .map_err(|e| WizardError::SerializationError(e.to_string()))?;
            writeln!(writer, "{}", line)
                .map_err(|e| WizardError::IoError(format!("Write failed: {}", e)))?;
        }
        writer
            .flush()
            .map_err(|e| WizardError::IoError(format!("Write failed: {}", e)))?;

        Ok(path)
    }
}

impl DataProcessor for FileDataProcessor {
    fn process(
        &self,
        source: &SourceFileRef,
        method: DataMethod,
    ) -> Result<ProcessedDataResult, WizardError> {
        let path = validate_file_path(Path::new(source.as_str()))?;
        let ext = validate_extension(&path, method)?;
        validate_file_size(&path, self.max_file_bytes)?;

        let content = std::fs::read_to_string(&path)
            .map_err(|e| WizardError::InvalidData(format!("Cannot read file: {}", e)))?;

        let entries = match (method, ext.as_str()) {
            (DataMethod::Book, _) => parse_book(&content),
            (DataMethod::Structured, "csv") => parse_qa_csv(&content),
            (DataMethod::Structured, "json") => parse_qa_json(&content)?,
            (DataMethod::Structured, _) => parse_qa_text(&content),
        };

        if entries.is_empty() {
            return Err(WizardError::InvalidData(format!(
                "No training entries found in '{}'",
                source.as_str()
            )));
        }

        let output = self.write_entries(&entries)?;
        tracing::info!(
            method = %method,
            entries = entries.len(),
            output = %output.display(),
            "Training data written"
        );

        Ok(ProcessedDataResult {
            output_file: Some(SourceFileRef::new(output.to_string_lossy())),
            ..ProcessedDataResult::new(method, source.clone(), entries.len() as u64)
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PARAGRAPH_A: &str = "It was a bright cold day in April, and the clocks were striking thirteen.";
    const PARAGRAPH_B: &str = "Winston Smith slipped quickly through the glass doors of Victory Mansions.";
    const PARAGRAPH_C: &str = "The hallway smelt of boiled cabbage and old rag mats at the far end.";

    #[test]
    fn qa_text_lines() {
        let content = "Question: What is AI? || Answer: Artificial Intelligence\n\
                       not a pair\n\
                       Question: What is MLX? || Answer: An array framework\n";
        let entries = parse_qa_text(content);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].prompt, "What is AI?");
        assert_eq!(entries[1].completion, "An array framework");
    }

    #[test]
    fn qa_csv_skips_header_and_keeps_commas() {
        let content = "question,answer\n\"What is LoRA?\",\"Low-rank adaptation, a PEFT method\"\n";
        let entries = parse_qa_csv(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prompt, "What is LoRA?");
        assert_eq!(entries[0].completion, "Low-rank adaptation, a PEFT method");
    }

    #[test]
    fn qa_csv_header_after_bom() {
        let entries = parse_qa_csv("\u{feff}question,answer\nQ,A\n");
        assert_eq!(entries, vec![TrainingEntry::new("Q", "A")]);
    }

    #[test]
    fn qa_json_accepts_alternate_keys() {
        let content = r#"[
            {"question": "Q1", "answer": "A1"},
            {"instruction": "Q2", "output": "A2"},
            {"question": "missing answer"}
        ]"#;
        let entries = parse_qa_json(content).expect("parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], TrainingEntry::new("Q2", "A2"));
    }

    #[test]
    fn qa_json_rejects_non_array() {
        let err = parse_qa_json(r#"{"question":"Q"}"#).expect_err("not an array");
        assert!(matches!(err, WizardError::InvalidData(_)));
    }

    #[test]
    fn book_pairs_consecutive_paragraphs() {
        let content = format!(
            "CHAPTER 1\n\n{}\n\n{}\n{}\n\n",
            PARAGRAPH_A, PARAGRAPH_B, PARAGRAPH_C
        );
        let entries = parse_book(&content);

        // The heading is dropped and B/C are joined into one paragraph
        assert_eq!(entries.len(), 1);
        assert!(entries[0].prompt.ends_with(PARAGRAPH_A));
        assert!(entries[0].completion.starts_with(PARAGRAPH_B));
    }

    #[test]
    fn process_writes_jsonl() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("qa.txt");
        std::fs::write(
            &source,
            "Question: A? || Answer: B\nQuestion: C? || Answer: D\n",
        )
        .expect("write");

        let processor = FileDataProcessor::new(dir.path().join("out"), 1024 * 1024);
        let result = processor
            .process(
                &SourceFileRef::new(source.to_string_lossy()),
                DataMethod::Structured,
            )
            .expect("process");

        assert_eq!(result.entries_generated, 2);
        assert_eq!(result.method, DataMethod::Structured);

        let written = std::fs::read_to_string(processor.output_path()).expect("read output");
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"prompt":"A?","completion":"B"}"#);
    }

    #[test]
    fn book_method_rejects_csv() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("data.csv");
        std::fs::write(&source, "question,answer\nQ,A\n").expect("write");

        let processor = FileDataProcessor::new(dir.path(), 1024);
        let err = processor
            .process(&SourceFileRef::new(source.to_string_lossy()), DataMethod::Book)
            .expect_err("extension mismatch");
        assert!(matches!(err, WizardError::InvalidData(_)));
    }

    #[test]
    fn oversized_file_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("big.txt");
        std::fs::write(&source, "Question: A? || Answer: B\n".repeat(10)).expect("write");

        let processor = FileDataProcessor::new(dir.path(), 16);
        assert!(
            processor
                .process(
                    &SourceFileRef::new(source.to_string_lossy()),
                    DataMethod::Structured
                )
                .is_err()
        );
    }

    #[test]
    fn empty_result_is_invalid_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("empty.txt");
        std::fs::write(&source, "nothing to see here\n").expect("write");

        let processor = FileDataProcessor::new(dir.path(), 1024);
        let err = processor
            .process(
                &SourceFileRef::new(source.to_string_lossy()),
                DataMethod::Structured,
            )
            .expect_err("no entries");
        assert!(matches!(err, WizardError::InvalidData(_)));
    }

    #[test]
    fn missing_file_is_invalid_data() {
        let processor = FileDataProcessor::new(".", 1024);
        let err = processor
            .process(&SourceFileRef::new("/no/such/file.txt"), DataMethod::Book)
            .expect_err("missing");
        assert!(matches!(err, WizardError::InvalidData(_)));
    }

    #[test]
    fn non_utf8_file_is_invalid_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("latin1.txt");
        std::fs::write(&source, [0x51, 0x3a, 0xe9, 0xff, 0x0a]).expect("write");

        let processor = FileDataProcessor::new(dir.path(), 1024);
        let err = processor
            .process(
                &SourceFileRef::new(source.to_string_lossy()),
                DataMethod::Structured,
            )
            .expect_err("not utf-8");
        assert!(matches!(err, WizardError::InvalidData(_)));
    }

    #[test]
    fn malformed_json_is_invalid_data() {
        let err = parse_qa_json("[{\"question\":").expect_err("truncated");
        assert!(matches!(err, WizardError::InvalidData(_)));
    }
}
