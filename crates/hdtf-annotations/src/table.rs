//! Line-oriented annotation tables.
//!
//! Every annotation file has one record per line: the first
//! whitespace-separated token is the key, the remaining tokens are the
//! value fields in order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{AnnotationError, AnnotationResult};

/// One parsed line of an annotation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub fields: Vec<String>,
    /// 1-based line number in the source file.
    pub line: usize,
}

/// A parsed annotation file: key → value fields, in file order.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    path: PathBuf,
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl AnnotationTable {
    /// Parse annotation text. `path` is only used for error reporting.
    ///
    /// Blank lines are skipped. A key appearing twice keeps the values of its
    /// last line at the position of its first.
    pub fn parse(contents: &str, path: impl Into<PathBuf>) -> AnnotationResult<Self> {
        let path = path.into();
        let mut records: Vec<Record> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (i, line) in contents.lines().enumerate() {
            let line_no = i + 1;
            let mut tokens = line.split_whitespace();
            let Some(key) = tokens.next() else {
                continue;
            };

            let record = Record {
                key: key.to_string(),
                fields: tokens.map(str::to_string).collect(),
                line: line_no,
            };

            // Later lines win but the key keeps its first position.
            match index.get(key).copied() {
                Some(pos) => {
                    let previous: &mut Record = &mut records[pos];
                    warn!(
                        path = %path.display(),
                        key,
                        first_line = previous.line,
                        line = line_no,
                        "Duplicate annotation key, keeping the later line"
                    );
                    *previous = record;
                }
                None => {
                    index.insert(record.key.clone(), records.len());
                    records.push(record);
                }
            }
        }

        Ok(Self {
            path,
            records,
            index,
        })
    }

    /// Read and parse an annotation file.
    pub async fn read(path: impl AsRef<Path>) -> AnnotationResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| AnnotationError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let table = Self::parse(&contents, path)?;
        debug!(path = %path.display(), records = table.len(), "Read annotation table");
        Ok(table)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    /// Records in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
