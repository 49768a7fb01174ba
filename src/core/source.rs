//! Delimited input reader with a header contract

use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::core::error::ImportError;

/// Columns every input header must contain (case-sensitive)
pub const REQUIRED_COLUMNS: [&str; 2] = ["title", "body"];

/// One input row as column name to raw cell value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line of the row in the input (the header is line 1)
    pub line: u64,
    fields: HashMap<String, String>,
}

impl RawRecord {
    /// Raw value of a column, if the row has one
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn from_pairs(line: u64, pairs: &[(&str, &str)]) -> Self {
        Self {
            line,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// An opened input whose header satisfied [`REQUIRED_COLUMNS`]
///
/// Rows are read lazily and only once; reading again means opening again.
pub struct Source<R: Read = BufReader<File>> {
    path: PathBuf,
    reader: csv::Reader<R>,
    headers: StringRecord,
}

impl Source {
    /// Open `path` and check its header
    pub fn open(path: &Path, delimiter: u8) -> Result<Self, ImportError> {
        let file = File::open(path).map_err(|source| ImportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path, BufReader::new(file), delimiter)
    }
}

impl<R: Read> Source<R> {
    /// Wrap any reader; `path` is used for diagnostics only
    pub fn from_reader(path: &Path, input: R, delimiter: u8) -> Result<Self, ImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(input);

        let headers = reader
            .headers()
            .map_err(|source| ImportError::Parse {
                path: path.to_path_buf(),
                line: 1,
                source,
            })?
            .clone();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !headers.iter().any(|h| h == **required))
            .map(|s| s.to_string())
            .collect();
        if !missing.is_empty() {
            let found = headers.iter().map(String::from).collect();
            return Err(ImportError::missing_columns(missing, found));
        }

        tracing::debug!(
            path = %path.display(),
            columns = headers.len(),
            "opened input"
        );

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            headers,
        })
    }

    /// Column names from the header row, in file order
    pub fn headers(&self) -> Vec<&str> {
        self.headers.iter().collect()
    }

    /// Consume the source, yielding rows in file order
    pub fn records(self) -> Records<R> {
        Records {
            path: self.path,
            inner: self.reader.into_records(),
            headers: self.headers,
        }
    }
}

/// Lazy row iterator returned by [`Source::records`]
pub struct Records<R: Read> {
    path: PathBuf,
    inner: csv::StringRecordsIntoIter<R>,
    headers: StringRecord,
}

impl<R: Read> Records<R> {
    fn to_raw(&self, record: &StringRecord) -> RawRecord {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        // Short rows simply lack the trailing columns; duplicate headers keep the last value
        let fields = self
            .headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        RawRecord { line, fields }
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<RawRecord, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        Some(match item {
            Ok(record) => Ok(self.to_raw(&record)),
            Err(source) => {
                let line = source
                    .position()
                    .map(|p| p.line())
                    .unwrap_or_default();
                Err(ImportError::Parse {
                    path: self.path.clone(),
                    line,
                    source,
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(input: &str) -> Result<Source<&[u8]>, ImportError> {
        Source::from_reader(Path::new("input.csv"), input.as_bytes(), b',')
    }

    #[test]
    fn test_reads_rows_in_order() {
        let src = source("title,body\nBug A,desc\n,x\n  Bug C  ,\n").unwrap();
        assert_eq!(src.headers(), vec!["title", "body"]);

        let rows: Vec<RawRecord> = src.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("title"), Some("Bug A"));
        assert_eq!(rows[0].get("body"), Some("desc"));
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].get("title"), Some(""));
        assert_eq!(rows[2].get("title"), Some("  Bug C  "));
        assert_eq!(rows[2].line, 4);
    }

    #[test]
    fn test_missing_body_column() {
        let err = source("title,labels\nBug,x\n").err().unwrap();
        match err {
            ImportError::MissingColumns { missing, found, .. } => {
                assert_eq!(missing, vec!["body"]);
                assert_eq!(found, vec!["title", "labels"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_both_columns() {
        let err = source("name,description\n").err().unwrap();
        assert!(matches!(
            err,
            ImportError::MissingColumns { ref missing, .. } if missing == &["title", "body"]
        ));
    }

    #[test]
    fn test_header_is_case_sensitive() {
        let err = source("Title,Body\nBug,x\n").err().unwrap();
        assert!(matches!(err, ImportError::MissingColumns { .. }));
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let err = source("").err().unwrap();
        assert!(matches!(err, ImportError::MissingColumns { .. }));
    }

    #[test]
    fn test_extra_columns_and_reordering() {
        let src = source("labels,body,title\nbug,Some body,A title\n").unwrap();
        let rows: Vec<RawRecord> = src.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[0].get("title"), Some("A title"));
        assert_eq!(rows[0].get("body"), Some("Some body"));
        assert_eq!(rows[0].get("labels"), Some("bug"));
    }

    #[test]
    fn test_short_row_lacks_trailing_columns() {
        let src = source("title,body\nOnly title\n").unwrap();
        let rows: Vec<RawRecord> = src.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[0].get("title"), Some("Only title"));
        assert_eq!(rows[0].get("body"), None);
    }

    #[test]
    fn test_quoted_multiline_body() {
        let src = source("title,body\n\"Bug, with comma\",\"line one\nline two\"\n").unwrap();
        let rows: Vec<RawRecord> = src.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[0].get("title"), Some("Bug, with comma"));
        assert_eq!(rows[0].get("body"), Some("line one\nline two"));
    }

    #[test]
    fn test_tab_delimiter() {
        let src = Source::from_reader(
            Path::new("input.tsv"),
            "title\tbody\nA, b\tc\n".as_bytes(),
            b'\t',
        )
        .unwrap();
        let rows: Vec<RawRecord> = src.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[0].get("title"), Some("A, b"));
        assert_eq!(rows[0].get("body"), Some("c"));
    }

    #[test]
    fn test_leading_byte_order_mark_is_ignored() {
        let src = source("\u{feff}title,body\nBug A,desc\n").unwrap();
        assert_eq!(src.headers(), vec!["title", "body"]);

        let rows: Vec<RawRecord> = src.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[0].get("title"), Some("Bug A"));
        assert_eq!(rows[0].get("body"), Some("desc"));
    }

    #[test]
    fn test_invalid_utf8_row_is_parse_error() {
        let mut input = b"title,body\n".to_vec();
        input.extend_from_slice(b"\xff\xfe,x\n");
        let src = Source::from_reader(Path::new("input.csv"), input.as_slice(), b',').unwrap();
        let results: Vec<_> = src.records().collect();
        assert!(matches!(results[0], Err(ImportError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_open_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result = Source::open(&tmp.path().join("absent.csv"), b',');
        assert!(matches!(result, Err(ImportError::Open { .. })));
    }
}
