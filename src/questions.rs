//! Question document loading
//!
//! The question document is a JSON array of records, fetched once per game
//! start from a file path or an http(s) URL.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::types::QuestionRecord;

/// Errors that leave the game in its prior state
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("question request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed question document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("question document contains no questions")]
    Empty,
}

/// Where the records come from
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<QuestionRecord>, LoadError>;

    /// Human readable location for logs
    fn describe(&self) -> String;
}

/// Parse a question document. Missing fields and a wrong number of wrong
/// answers are rejected by the record type itself.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<QuestionRecord>, LoadError> {
    let records: Vec<QuestionRecord> = serde_json::from_slice(bytes)?;
    if records.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(records)
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    async fn fetch(&self) -> Result<Vec<QuestionRecord>, LoadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_records(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<QuestionRecord>, LoadError> {
        let bytes = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        parse_records(&bytes)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// In-memory records, handy for tests and embedding
pub struct StaticSource {
    records: Vec<QuestionRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<QuestionRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl QuestionSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<QuestionRecord>, LoadError> {
        if self.records.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("{} built-in questions", self.records.len())
    }
}

/// Pick a source for a configured location: URLs go over HTTP, anything else is a path
pub fn source_for(location: &str) -> Arc<dyn QuestionSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpSource::new(location))
    } else {
        Arc::new(FileSource::new(location))
    }
}
