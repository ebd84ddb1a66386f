//! Manifest ingestion and redaction
//!
//! The manifest is a headerless CSV in a legacy Japanese encoding. Column 0
//! names the recording file and column 2 holds the raw patient identifier.
//!
//! Processing happens in two steps:
//!
//! 1. [`ManifestProcessor::ingest`] decodes and tokenizes the file, stores one
//!    pseudonym record per row that carries an identifier and collects the
//!    target filenames and redacted rows in file order.
//! 2. [`ManifestProcessor::write_redacted`] writes the redacted rows as UTF-8
//!    CSV next to the anonymized recordings.
//!
//! Any decoding or framing problem aborts the run: a manifest that is only
//! partly readable cannot be trusted to map files to the right patients.

use crate::adapters::store::PseudonymStore;
use crate::config::ManifestConfig;
use crate::core::pseudonym::Pseudonymizer;
use crate::domain::manifest::REDACTED_COLUMNS;
use crate::domain::{ManifestError, ManifestRow, PseudonymRecord, RedactedRow, Result};
use encoding_rs::Encoding;
use std::path::{Path, PathBuf};

/// Result of ingesting one manifest
#[derive(Debug, Clone, Default)]
pub struct ManifestIngest {
    /// Target filenames in file order, duplicates preserved
    pub target_filenames: Vec<String>,

    /// Redacted rows in file order
    pub redacted_rows: Vec<RedactedRow>,

    /// Number of pseudonym records written to the store
    pub records_stored: usize,

    /// Number of empty rows that were skipped
    pub empty_rows: usize,
}

/// Result of [`ManifestProcessor::process`]
#[derive(Debug, Clone)]
pub struct ManifestOutcome {
    /// Ingestion result
    pub ingest: ManifestIngest,

    /// Where the redacted manifest was written
    pub redacted_path: PathBuf,
}

/// Decodes, pseudonymizes and redacts manifests
#[derive(Debug, Clone)]
pub struct ManifestProcessor {
    encoding: &'static Encoding,
    redacted_suffix: String,
}

impl ManifestProcessor {
    /// Create a processor from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured encoding label is unknown.
    pub fn new(config: &ManifestConfig) -> Result<Self> {
        let encoding = Encoding::for_label(config.encoding.as_bytes())
            .ok_or_else(|| ManifestError::UnsupportedEncoding(config.encoding.clone()))?;

        Ok(Self {
            encoding,
            redacted_suffix: config.redacted_suffix.clone(),
        })
    }

    /// Name of the encoding manifests are decoded from
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Ingest the manifest and write its redacted copy into `output_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read, decoded or parsed, if
    /// a pseudonym record cannot be stored, or if the redacted copy cannot be
    /// written. All of these are fatal to the run.
    pub async fn process(
        &self,
        manifest_path: &Path,
        output_dir: &Path,
        pseudonymizer: &Pseudonymizer,
        store: &dyn PseudonymStore,
    ) -> Result<ManifestOutcome> {
        let ingest = self.ingest(manifest_path, pseudonymizer, store).await?;
        let redacted_path = self.write_redacted(&ingest.redacted_rows, manifest_path, output_dir)?;
        Ok(ManifestOutcome {
            ingest,
            redacted_path,
        })
    }

    /// Decode the manifest, pseudonymize every row and store the records
    ///
    /// For each row with a patient identifier column the pseudonym record is
    /// inserted into the store before the token is placed in the redacted row.
    ///
    /// # Errors
    ///
    /// See [`process`](Self::process).
    pub async fn ingest(
        &self,
        manifest_path: &Path,
        pseudonymizer: &Pseudonymizer,
        store: &dyn PseudonymStore,
    ) -> Result<ManifestIngest> {
        let text = self.decode_file(manifest_path).await?;
        let rows = parse_rows(&text)?;
        let mut ingest = ManifestIngest::default();

        for (index, row) in rows.into_iter().enumerate() {
            if is_empty_row(&row) {
                tracing::warn!(row = index + 1, "Skipping empty manifest row");
                ingest.empty_rows += 1;
                continue;
            }

            let filename = row.filename().unwrap_or_default().to_string();

            let redacted = match row.patient_id() {
                Some(patient_id) if row.len() >= REDACTED_COLUMNS => {
                    let token = pseudonymizer.token_for(patient_id);
                    store
                        .insert(PseudonymRecord::new(token.clone(), &row))
                        .await?;
                    ingest.records_stored += 1;
                    row.redact(Some(&token))
                }
                _ => {
                    tracing::debug!(
                        row = index + 1,
                        fields = row.len(),
                        "Manifest row has no patient identifier column"
                    );
                    row.redact(None)
                }
            };

            ingest.target_filenames.push(filename);
            ingest.redacted_rows.push(redacted);
        }

        tracing::info!(
            manifest = %manifest_path.display(),
            targets = ingest.target_filenames.len(),
            records = ingest.records_stored,
            empty_rows = ingest.empty_rows,
            store = store.backend_name(),
            "Manifest ingested"
        );

        Ok(ingest)
    }

    /// Path of the redacted copy of `manifest_path` inside `output_dir`
    pub fn redacted_path(&self, manifest_path: &Path, output_dir: &Path) -> PathBuf {
        let stem = manifest_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        output_dir.join(format!("{stem}{}.csv", self.redacted_suffix))
    }

    /// Write redacted rows as UTF-8 CSV into `output_dir`
    ///
    /// The output directory is created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created or written.
    pub fn write_redacted(
        &self,
        rows: &[RedactedRow],
        manifest_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        crate::core::executor::ensure_output_dir(output_dir)?;

        let path = self.redacted_path(manifest_path, output_dir);
        let write_failed = |message: String| ManifestError::WriteFailed {
            path: path.display().to_string(),
            message,
        };

        // Short rows are emitted as-is, so row lengths may differ
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| write_failed(e.to_string()))?;

        for row in rows {
            writer
                .write_record(row.fields())
                .map_err(|e| write_failed(e.to_string()))?;
        }
        writer.flush().map_err(|e| write_failed(e.to_string()))?;

        tracing::info!(path = %path.display(), rows = rows.len(), "Redacted manifest written");
        Ok(path)
    }

    /// Read and transcode a manifest to UTF-8
    ///
    /// A byte order mark overrides the configured encoding.
    async fn decode_file(&self, path: &Path) -> std::result::Result<String, ManifestError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| ManifestError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.decode_bytes(&bytes).ok_or_else(|| ManifestError::Decode {
            path: path.display().to_string(),
            encoding: self.encoding.name().to_string(),
        })
    }

    fn decode_bytes(&self, bytes: &[u8]) -> Option<String> {
        let (encoding, body) = match Encoding::for_bom(bytes) {
            Some((bom_encoding, bom_len)) => (bom_encoding, &bytes[bom_len..]),
            None => (self.encoding, bytes),
        };
        encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| text.into_owned())
    }
}

/// Tokenize decoded manifest text into rows
///
/// The manifest has no header row. Every row must have the same number of
/// columns; quoting must be balanced. The csv reader skips blank lines, so
/// each one is put back as a row with no fields at its place in file order.
fn parse_rows(text: &str) -> std::result::Result<Vec<ManifestRow>, ManifestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    loop {
        let start = usize::try_from(reader.position().byte()).unwrap_or(usize::MAX);
        let more = reader.read_record(&mut record)?;

        let blank_lines = blank_lines_at(text.as_bytes(), start);
        rows.extend(std::iter::repeat_with(|| ManifestRow::new(Vec::new())).take(blank_lines));

        if !more {
            break;
        }
        rows.push(ManifestRow::new(
            record.iter().map(str::to_string).collect(),
        ));
    }
    Ok(rows)
}

/// Number of blank lines in the run of line breaks starting at `start`
///
/// `start` is where the reader resumed, right after the previous record's
/// terminator. A `\n` that completes a `\r\n` pair is not a new line.
fn blank_lines_at(bytes: &[u8], start: usize) -> usize {
    let mut previous = start.checked_sub(1).and_then(|i| bytes.get(i)).copied();
    let mut count = 0;
    for &byte in bytes.iter().skip(start) {
        match byte {
            b'\n' if previous == Some(b'\r') => {}
            b'\n' | b'\r' => count += 1,
            _ => break,
        }
        previous = Some(byte);
    }
    count
}

/// A row with no fields (a blank line), or only blank fields (spreadsheet
/// exports write empty lines as `,,`)
fn is_empty_row(row: &ManifestRow) -> bool {
    row.fields().iter().all(|f| f.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryStore;
    use crate::config::secret_string;
    use crate::core::pseudonym::pseudonymize;
    use crate::domain::DeidError;
    use tempfile::tempdir;

    fn processor() -> ManifestProcessor {
        ManifestProcessor::new(&ManifestConfig::default()).unwrap()
    }

    fn pseudonymizer() -> Pseudonymizer {
        Pseudonymizer::new(secret_string("s".to_string()))
    }

    fn shift_jis(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let config = ManifestConfig {
            encoding: "not-an-encoding".to_string(),
            ..Default::default()
        };
        assert!(ManifestProcessor::new(&config).is_err());
    }

    #[test]
    fn test_decode_shift_jis() {
        let p = processor();
        let bytes = shift_jis("rec1.mwf,心電図,PID123\n");
        assert_eq!(p.decode_bytes(&bytes).unwrap(), "rec1.mwf,心電図,PID123\n");
    }

    #[test]
    fn test_decode_invalid_bytes() {
        // 0x81 starts a two-byte sequence that 0x20 cannot complete
        assert!(processor().decode_bytes(&[0x81, 0x20, 0xFF]).is_none());
    }

    #[test]
    fn test_decode_utf8_bom_overrides() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend("a.mwf,検査,P1\n".as_bytes());
        assert_eq!(processor().decode_bytes(&bytes).unwrap(), "a.mwf,検査,P1\n");
    }

    #[test]
    fn test_parse_rows_inconsistent_columns() {
        let err = parse_rows("a.mwf,X,P1\nb.mwf,Y\n").unwrap_err();
        assert!(matches!(err, ManifestError::MalformedCsv(_)));
    }

    #[test]
    fn test_parse_rows_quoted_fields() {
        let rows = parse_rows("\"a,1.mwf\",\"X \"\"q\"\"\",P1\n").unwrap();
        assert_eq!(rows[0].filename(), Some("a,1.mwf"));
        assert_eq!(rows[0].fields()[1], "X \"q\"");
    }

    #[test]
    fn test_is_empty_row() {
        assert!(is_empty_row(&ManifestRow::new(vec![])));
        assert!(is_empty_row(&ManifestRow::new(vec![
            String::new(),
            " ".to_string(),
            String::new()
        ])));
        assert!(!is_empty_row(&ManifestRow::new(vec!["a.mwf".to_string()])));
    }

    #[test]
    fn test_redacted_path() {
        let p = processor();
        let path = p.redacted_path(Path::new("/in/list.csv"), Path::new("/out/run"));
        assert_eq!(path, PathBuf::from("/out/run/list_anonymized.csv"));
    }

    #[tokio::test]
    async fn test_ingest_redaction_shape() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.csv");
        std::fs::write(&manifest, shift_jis("rec1.mwf,X,PID123,extra\n")).unwrap();

        let store = InMemoryStore::new();
        let ingest = processor()
            .ingest(&manifest, &pseudonymizer(), &store)
            .await
            .unwrap();

        let token = pseudonymize("PID123", "s");
        assert_eq!(ingest.target_filenames, vec!["rec1.mwf"]);
        assert_eq!(
            ingest.redacted_rows[0].fields(),
            &["rec1.mwf".to_string(), "X".to_string(), token.as_str().to_string()]
        );

        let records = store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].token, token);
        assert_eq!(records[0].original_row, vec!["rec1.mwf", "X", "PID123", "extra"]);
    }

    #[tokio::test]
    async fn test_ingest_skips_empty_rows() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.csv");
        std::fs::write(&manifest, shift_jis("a.mwf,X,P1\n,,\nb.mwf,Y,P2\n")).unwrap();

        let store = InMemoryStore::new();
        let ingest = processor()
            .ingest(&manifest, &pseudonymizer(), &store)
            .await
            .unwrap();

        assert_eq!(ingest.target_filenames, vec!["a.mwf", "b.mwf"]);
        assert_eq!(ingest.empty_rows, 1);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_ingest_counts_blank_lines() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.csv");
        std::fs::write(&manifest, shift_jis("a.mwf,X,P1\n\nb.mwf,Y,P2\n")).unwrap();

        let store = InMemoryStore::new();
        let ingest = processor()
            .ingest(&manifest, &pseudonymizer(), &store)
            .await
            .unwrap();

        assert_eq!(ingest.target_filenames, vec!["a.mwf", "b.mwf"]);
        assert_eq!(ingest.empty_rows, 1);
        assert_eq!(ingest.records_stored, 2);
    }

    #[test]
    fn test_parse_rows_keeps_blank_lines_in_order() {
        let rows = parse_rows("\na.mwf,X,P1\n\n\nb.mwf,Y,P2\n").unwrap();
        let widths: Vec<usize> = rows.iter().map(ManifestRow::len).collect();
        assert_eq!(widths, vec![0, 3, 0, 0, 3]);
        assert_eq!(rows[4].filename(), Some("b.mwf"));
    }

    #[test]
    fn test_parse_rows_crlf_terminators_are_not_blank() {
        let rows = parse_rows("a.mwf,X,P1\r\nb.mwf,Y,P2\r\n").unwrap();
        assert_eq!(rows.len(), 2);

        let rows = parse_rows("a.mwf,X,P1\r\n\r\nb.mwf,Y,P2\r\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert!(is_empty_row(&rows[1]));
    }

    #[test]
    fn test_parse_rows_newline_inside_quotes_is_not_blank() {
        let rows = parse_rows("a.mwf,\"X\n\nY\",P1\nb.mwf,Z,P2\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields()[1], "X\n\nY");
    }

    #[tokio::test]
    async fn test_ingest_short_rows_not_stored() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.csv");
        std::fs::write(&manifest, "a.mwf,X\nb.mwf,Y\n").unwrap();

        let store = InMemoryStore::new();
        let ingest = processor()
            .ingest(&manifest, &pseudonymizer(), &store)
            .await
            .unwrap();

        assert_eq!(ingest.target_filenames.len(), 2);
        assert_eq!(ingest.redacted_rows[1].fields(), &["b.mwf", "Y"]);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_ingest_keeps_duplicates_in_order() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.csv");
        std::fs::write(&manifest, "b.mwf,X,P1\na.mwf,X,P2\nb.mwf,X,P1\n").unwrap();

        let store = InMemoryStore::new();
        let ingest = processor()
            .ingest(&manifest, &pseudonymizer(), &store)
            .await
            .unwrap();

        assert_eq!(ingest.target_filenames, vec!["b.mwf", "a.mwf", "b.mwf"]);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_ingest_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let store = InMemoryStore::new();
        let err = processor()
            .ingest(&dir.path().join("none.csv"), &pseudonymizer(), &store)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeidError::Manifest(ManifestError::Unreadable { .. })
        ));
    }

    #[tokio::test]
    async fn test_ingest_unbalanced_quote_is_fatal() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.csv");
        std::fs::write(&manifest, "a.mwf,X,P1\n\"b.mwf,Y,P2\n").unwrap();

        let store = InMemoryStore::new();
        let result = processor().ingest(&manifest, &pseudonymizer(), &store).await;
        assert!(matches!(
            result,
            Err(DeidError::Manifest(ManifestError::MalformedCsv(_)))
        ));
    }

    #[tokio::test]
    async fn test_process_writes_redacted_manifest() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.csv");
        std::fs::write(
            &manifest,
            shift_jis("rec1.mwf,心電図,PID123,extra\nrec2.mwf,Y,PID9,more\n"),
        )
        .unwrap();

        let output_dir = dir.path().join("out").join("run");
        let store = InMemoryStore::new();
        let outcome = processor()
            .process(&manifest, &output_dir, &pseudonymizer(), &store)
            .await
            .unwrap();

        assert_eq!(outcome.redacted_path, output_dir.join("list_anonymized.csv"));
        let written = std::fs::read_to_string(&outcome.redacted_path).unwrap();
        assert_eq!(
            written,
            format!(
                "rec1.mwf,心電図,{}\nrec2.mwf,Y,{}\n",
                pseudonymize("PID123", "s"),
                pseudonymize("PID9", "s")
            )
        );
    }
}
