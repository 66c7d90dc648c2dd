use chrono::{DateTime, Local};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Row};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{DisplayMode, QuizMode};
use crate::session::SessionRecord;
use crate::util::{mean, std_dev};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable destination for finished rounds
pub trait RecordSink {
    /// Persist one record and describe where it went.
    fn save(&mut self, record: &SessionRecord) -> Result<String, StoreError>;
}

/// Saves to every sink; the first failure is reported after all were tried.
impl RecordSink for Vec<Box<dyn RecordSink>> {
    fn save(&mut self, record: &SessionRecord) -> Result<String, StoreError> {
        let mut saved = Vec::new();
        let mut failure = None;
        for sink in self.iter_mut() {
            match sink.save(record) {
                Ok(destination) => saved.push(destination),
                Err(e) => {
                    tracing::warn!("record sink failed: {e}");
                    failure.get_or_insert(e);
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(saved.join(", ")),
        }
    }
}

impl ToSql for DisplayMode {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for DisplayMode {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "full" => Ok(DisplayMode::Full),
            "sequential" => Ok(DisplayMode::Sequential),
            other => Err(FromSqlError::Other(
                format!("unknown display mode {other:?}").into(),
            )),
        }
    }
}

impl ToSql for QuizMode {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for QuizMode {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "ordered" => Ok(QuizMode::Ordered),
            "unordered" => Ok(QuizMode::Unordered),
            other => Err(FromSqlError::Other(
                format!("unknown quiz mode {other:?}").into(),
            )),
        }
    }
}

/// A record read back from the database
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub id: i64,
    pub record: SessionRecord,
}

/// Score statistics for one quiz mode
#[derive(Debug, Clone, PartialEq)]
pub struct ModeSummary {
    pub quiz_mode: QuizMode,
    pub sessions: usize,
    pub mean_score: f64,
    pub std_dev: f64,
    pub best_score: f64,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    hostname TEXT NOT NULL,
    display_mode TEXT NOT NULL,
    quiz_mode TEXT NOT NULL,
    delay_seconds REAL NOT NULL,
    word_count INTEGER NOT NULL,
    math_challenge BOOLEAN NOT NULL,
    fixed_delay BOOLEAN NOT NULL,
    letters_only BOOLEAN NOT NULL,
    stimulus TEXT NOT NULL,
    submission TEXT NOT NULL,
    score_percent REAL NOT NULL,
    challenge_question TEXT,
    failed_challenge_attempts INTEGER,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON sessions(timestamp);
CREATE INDEX IF NOT EXISTS idx_sessions_quiz_mode ON sessions(quiz_mode);
"#;

const SELECT_COLUMNS: &str = "id, timestamp, hostname, display_mode, quiz_mode, delay_seconds, \
     word_count, math_challenge, fixed_delay, letters_only, stimulus, submission, score_percent, \
     challenge_question, failed_challenge_attempts";

/// SQLite store of every completed round
#[derive(Debug)]
pub struct SessionDb {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SessionDb {
    /// Open (creating if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record_session(&self, record: &SessionRecord) -> Result<i64, StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO sessions
            (timestamp, hostname, display_mode, quiz_mode, delay_seconds, word_count,
             math_challenge, fixed_delay, letters_only, stimulus, submission, score_percent,
             challenge_question, failed_challenge_attempts)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                record.timestamp.to_rfc3339(),
                record.hostname,
                record.display_mode,
                record.quiz_mode,
                record.delay_seconds,
                record.word_count as i64,
                record.math_challenge,
                record.fixed_delay,
                record.letters_only,
                record.stimulus,
                record.submission,
                record.score_percent,
                record.challenge_question,
                record.failed_challenge_attempts,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn row_to_session(row: &Row<'_>) -> rusqlite::Result<StoredSession> {
        let timestamp_str: String = row.get(1)?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e)))?
            .with_timezone(&Local);
        let word_count: i64 = row.get(6)?;

        Ok(StoredSession {
            id: row.get(0)?,
            record: SessionRecord {
                timestamp,
                hostname: row.get(2)?,
                display_mode: row.get(3)?,
                quiz_mode: row.get(4)?,
                delay_seconds: row.get(5)?,
                word_count: word_count.max(0) as usize,
                math_challenge: row.get(7)?,
                fixed_delay: row.get(8)?,
                letters_only: row.get(9)?,
                stimulus: row.get(10)?,
                submission: row.get(11)?,
                score_percent: row.get(12)?,
                challenge_question: row.get(13)?,
                failed_challenge_attempts: row.get(14)?,
            },
        })
    }

    /// Newest first
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<StoredSession>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM sessions ORDER BY timestamp DESC, id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map([limit as i64], Self::row_to_session)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Newest first, one quiz mode only
    pub fn sessions_by_mode(
        &self,
        quiz_mode: QuizMode,
        limit: usize,
    ) -> Result<Vec<StoredSession>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM sessions WHERE quiz_mode = ?1 \
             ORDER BY timestamp DESC, id DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![quiz_mode, limit as i64], Self::row_to_session)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Mean, spread and best score per quiz mode; modes never played are left out
    pub fn summary(&self) -> Result<Vec<ModeSummary>, StoreError> {
        let mut summaries = Vec::new();
        for quiz_mode in [QuizMode::Ordered, QuizMode::Unordered] {
            let mut stmt = self
                .conn
                .prepare("SELECT score_percent FROM sessions WHERE quiz_mode = ?1")?;
            let scores = stmt
                .query_map([quiz_mode], |row| row.get::<_, f64>(0))?
                .collect::<rusqlite::Result<Vec<f64>>>()?;

            if let (Some(mean_score), Some(spread)) = (mean(&scores), std_dev(&scores)) {
                summaries.push(ModeSummary {
                    quiz_mode,
                    sessions: scores.len(),
                    mean_score,
                    std_dev: spread,
                    best_score: scores.iter().copied().fold(f64::MIN, f64::max),
                });
            }
        }
        Ok(summaries)
    }
}

impl RecordSink for SessionDb {
    fn save(&mut self, record: &SessionRecord) -> Result<String, StoreError> {
        let id = self.record_session(record)?;
        tracing::info!(id, "session stored");
        Ok(match &self.path {
            Some(path) => format!("{} (session #{id})", path.display()),
            None => format!("memory (session #{id})"),
        })
    }
}

/// Writes each record to its own CSV file, named after the host and the
/// round's start time
#[derive(Debug, Clone)]
pub struct CsvRecordWriter {
    dir: PathBuf,
}

impl CsvRecordWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn file_name(record: &SessionRecord) -> String {
        let host: String = record
            .hostname
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
            .collect();
        format!(
            "{}_quiz_{}.csv",
            host,
            record.timestamp.format("%Y%m%d-%H%M%S-%3f")
        )
    }

    pub fn write(&self, record: &SessionRecord) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::file_name(record));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.serialize(record)?;
        writer.flush()?;
        Ok(path)
    }
}

impl RecordSink for CsvRecordWriter {
    fn save(&mut self, record: &SessionRecord) -> Result<String, StoreError> {
        let path = self.write(record)?;
        tracing::info!(path = %path.display(), "session exported");
        Ok(path.display().to_string())
    }
}
