use std::path::Path;

use serde::Serialize;

use crate::error::{KgpathError, Result};
use crate::graph::Sample;

// Column layout of a relation-extraction result line
const RELATION_FIELD: usize = 0;
const HEAD_NAME_FIELD: usize = 3;
const HEAD_TAG_FIELD: usize = 4;
const TAIL_NAME_FIELD: usize = 6;
const TAIL_TAG_FIELD: usize = 7;
const MIN_FIELDS: usize = TAIL_TAG_FIELD + 1;

/// A dropped input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseSkip {
    /// 1-based line number in the input
    pub line: usize,
    pub reason: String,
}

/// Samples read from one input, plus the lines that were skipped
#[derive(Debug, Clone, Default, Serialize)]
pub struct SampleBatch {
    pub samples: Vec<Sample>,
    pub skipped: Vec<ParseSkip>,
}

/// Parse one tab-separated line into a sample
///
/// Fields are trimmed. Columns past the tail tag are ignored.
pub fn parse_line(line: &str) -> std::result::Result<Sample, String> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() < MIN_FIELDS {
        return Err(format!(
            "expected at least {} tab-separated fields, found {}",
            MIN_FIELDS,
            fields.len()
        ));
    }

    Ok(Sample::new(
        fields[RELATION_FIELD].trim(),
        fields[HEAD_NAME_FIELD].trim(),
        fields[HEAD_TAG_FIELD].trim(),
        fields[TAIL_NAME_FIELD].trim(),
        fields[TAIL_TAG_FIELD].trim(),
    ))
}

/// Parse relation-extraction output
///
/// Blank lines are ignored. Malformed lines are logged and recorded in
/// `skipped`; they never fail the whole batch.
pub fn parse_samples(content: &str, skip_header: bool) -> SampleBatch {
    let mut batch = SampleBatch::default();

    for (idx, line) in content.lines().enumerate() {
        if idx == 0 && skip_header {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(sample) => batch.samples.push(sample),
            Err(reason) => {
                log::warn!("Skipping line {}: {}", idx + 1, reason);
                batch.skipped.push(ParseSkip {
                    line: idx + 1,
                    reason,
                });
            }
        }
    }

    log::info!(
        "Parsed {} samples ({} lines skipped)",
        batch.samples.len(),
        batch.skipped.len()
    );
    batch
}

/// Read and parse a sample file
pub fn read_samples(path: &Path, skip_header: bool) -> Result<SampleBatch> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        KgpathError::Parse(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(parse_samples(&content, skip_header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "relation\tsentence\tpair\thead\thead_tag\thead_span\ttail\ttail_tag";

    fn line(rel: &str, head: &str, head_tag: &str, tail: &str, tail_tag: &str) -> String {
        format!("{rel}\tsent\t0\t{head}\t{head_tag}\t1:2\t{tail}\t{tail_tag}")
    }

    #[test]
    fn test_parse_line_fields() {
        let sample = parse_line(&line("TrAP", " the c-collar ", "treatment", "pain", "problem")).unwrap();
        assert_eq!(sample, Sample::new("TrAP", "the c-collar", "treatment", "pain", "problem"));
    }

    #[test]
    fn test_parse_line_extra_columns() {
        let text = format!("{}\textra\tmore", line("PIP", "a", "problem", "b", "problem"));
        assert_eq!(parse_line(&text).unwrap().tail_tag, "problem");
    }

    #[test]
    fn test_parse_line_too_few_fields() {
        let err = parse_line("TrAP\tsent\t0\thead\thead_tag").unwrap_err();
        assert!(err.contains("found 5"));
    }

    #[test]
    fn test_header_skipped() {
        let content = format!("{}\n{}\n", HEADER, line("TrAP", "a", "treatment", "b", "problem"));
        let batch = parse_samples(&content, true);
        assert_eq!(batch.samples.len(), 1);
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn test_header_kept_when_disabled() {
        let content = format!(
            "{}\n{}\n",
            line("TrAP", "a", "treatment", "b", "problem"),
            line("TrAP", "c", "treatment", "d", "problem"),
        );
        assert_eq!(parse_samples(&content, false).samples.len(), 2);
        assert_eq!(parse_samples(&content, true).samples.len(), 1);
    }

    #[test]
    fn test_malformed_line_skipped_not_fatal() {
        let content = format!(
            "{}\n{}\nbroken\tline\n\n{}\n",
            HEADER,
            line("TrAP", "a", "treatment", "b", "problem"),
            line("PIP", "b", "problem", "c", "problem"),
        );
        let batch = parse_samples(&content, true);
        assert_eq!(batch.samples.len(), 2);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].line, 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = format!("{}\r\n{}\r\n", HEADER, line("TrAP", "a", "treatment", "b", "problem"));
        let batch = parse_samples(&content, true);
        assert_eq!(batch.samples[0].tail_tag, "problem");
    }

    #[test]
    fn test_read_samples_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("re_result.txt");
        std::fs::write(&path, format!("{}\n{}\n", HEADER, line("TrAP", "a", "treatment", "b", "problem"))).unwrap();
        let batch = read_samples(&path, true).unwrap();
        assert_eq!(batch.samples.len(), 1);
    }

    #[test]
    fn test_read_samples_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_samples(&temp_dir.path().join("missing.txt"), true).unwrap_err();
        assert!(matches!(err, KgpathError::Parse(_)));
    }
}
