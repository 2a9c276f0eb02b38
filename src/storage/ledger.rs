use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::error;

use super::{LedgerError, LedgerResult, QueryLedger, QueryRecord, SavingsRecord};

const QUERIES_FILE: &str = "queries.jsonl";
const SAVINGS_FILE: &str = "savings.jsonl";

/// Two JSON-lines files, one record per line, only ever appended to.
#[derive(Debug, Clone)]
pub struct JsonlLedger {
    base_path: PathBuf,
}

impl JsonlLedger {
    pub fn new<P: AsRef<Path>>(base_path: P) -> LedgerResult<Self> {
        fs::create_dir_all(base_path.as_ref())?;
        Ok(Self {
            base_path: base_path.as_ref().to_path_buf(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn queries_file(&self) -> PathBuf {
        self.base_path.join(QUERIES_FILE)
    }

    fn savings_file(&self) -> PathBuf {
        self.base_path.join(SAVINGS_FILE)
    }

    fn json_line<T: Serialize>(record: &T) -> LedgerResult<String> {
        let mut json = serde_json::to_string(record)?;
        json.push('\n');
        Ok(json)
    }

    fn open_locked(path: &Path) -> LedgerResult<File> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        file.lock_exclusive()
            .map_err(|_| LedgerError::Locked(path.display().to_string()))?;
        Ok(file)
    }

    /// Appends one line to each file. The queries file stays locked until
    /// the savings line lands, and its line is truncated away again if the
    /// savings write fails, so the two files always pair up line for line.
    fn append_pair(&self, query: &QueryRecord, savings: &SavingsRecord) -> LedgerResult<()> {
        let query_line = Self::json_line(query)?;
        let savings_line = Self::json_line(savings)?;

        let mut queries = Self::open_locked(&self.queries_file())?;
        let result =
            Self::write_paired(&mut queries, &query_line, &self.savings_file(), &savings_line);
        queries.unlock().ok();
        result
    }

    fn write_paired(
        queries: &mut File,
        query_line: &str,
        savings_path: &Path,
        savings_line: &str,
    ) -> LedgerResult<()> {
        let committed_len = queries.metadata()?.len();
        queries.write_all(query_line.as_bytes())?;

        let saved = Self::open_locked(savings_path).and_then(|mut savings| {
            let written = savings.write_all(savings_line.as_bytes());
            savings.unlock().ok();
            written.map_err(LedgerError::from)
        });

        if let Err(e) = saved {
            if let Err(rollback) = queries.set_len(committed_len) {
                error!(error = %rollback, "Failed to roll back unpaired query line");
            }
            return Err(e);
        }
        Ok(())
    }

    fn read_lines<T: DeserializeOwned>(path: &Path) -> LedgerResult<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path)?;
        file.lock_shared()
            .map_err(|_| LedgerError::Locked(path.display().to_string()))?;

        let mut records = Vec::new();
        let mut outcome = Ok(());
        for (index, line) in BufReader::new(&file).lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    outcome = Err(LedgerError::Io(e));
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    outcome = Err(LedgerError::Corrupt {
                        file: path.display().to_string(),
                        line: index + 1,
                        message: e.to_string(),
                    });
                    break;
                }
            }
        }

        file.unlock().ok();
        outcome.map(|_| records)
    }
}

#[async_trait]
impl QueryLedger for JsonlLedger {
    async fn append(&self, query: QueryRecord, savings: SavingsRecord) -> LedgerResult<()> {
        let ledger = self.clone();
        tokio::task::spawn_blocking(move || ledger.append_pair(&query, &savings))
        .await
        .map_err(|e| LedgerError::Io(std::io::Error::other(e)))?
    }

    async fn queries(&self) -> LedgerResult<Vec<QueryRecord>> {
        let path = self.queries_file();
        tokio::task::spawn_blocking(move || Self::read_lines(&path))
            .await
            .map_err(|e| LedgerError::Io(std::io::Error::other(e)))?
    }

    async fn savings(&self) -> LedgerResult<Vec<SavingsRecord>> {
        let path = self.savings_file();
        tokio::task::spawn_blocking(move || Self::read_lines(&path))
            .await
            .map_err(|e| LedgerError::Io(std::io::Error::other(e)))?
    }
}
