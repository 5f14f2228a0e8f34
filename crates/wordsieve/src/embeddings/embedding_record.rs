use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::{WSResult, WordsieveError};

/// The on-disk layout of an embedding table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingFormat {
    /// `word2vec` binary records.
    #[default]
    Binary,

    /// `word2vec` text records.
    Text,
}

impl EmbeddingFormat {
    /// The conventional file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Binary => "bin",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for EmbeddingFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Self::Binary => "binary",
            Self::Text => "text",
        })
    }
}

impl FromStr for EmbeddingFormat {
    type Err = WordsieveError;

    fn from_str(s: &str) -> WSResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(Self::Binary),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(WordsieveError::InvalidConfig(format!(
                "unknown embedding format {s:?}; expected \"binary\" or \"text\""
            ))),
        }
    }
}

/// The header of an embedding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmbeddingHeader {
    /// The declared number of records.
    pub count: usize,

    /// The vector dimensionality shared by every record.
    pub dims: usize,
}

/// One token and its vector.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    /// The token text.
    pub token: String,

    /// The embedding vector; `header.dims` long.
    pub vector: Vec<f32>,
}

impl EmbeddingRecord {
    /// Create a new record.
    pub fn new<S: Into<String>>(
        token: S,
        vector: Vec<f32>,
    ) -> Self {
        Self {
            token: token.into(),
            vector,
        }
    }
}

/// An in-memory embedding table.
///
/// Mostly useful for tests and small fixtures; real tables should be read
/// with [`crate::embeddings::EmbeddingTableFile`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingTable {
    /// The vector dimensionality.
    pub dims: usize,

    /// The records, in table order.
    pub records: Vec<EmbeddingRecord>,
}

impl EmbeddingTable {
    /// Build a table, checking that all vectors share `dims`.
    pub fn new(
        dims: usize,
        records: Vec<EmbeddingRecord>,
    ) -> WSResult<Self> {
        if let Some((idx, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.vector.len() != dims)
        {
            return Err(WordsieveError::malformed(
                format_args!("record {}", idx + 1),
                format_args!(
                    "vector for {:?} has {} components, expected {dims}",
                    record.token,
                    record.vector.len()
                ),
            ));
        }
        Ok(Self { dims, records })
    }

    /// The header describing this table.
    pub fn header(&self) -> EmbeddingHeader {
        EmbeddingHeader {
            count: self.records.len(),
            dims: self.dims,
        }
    }
}
