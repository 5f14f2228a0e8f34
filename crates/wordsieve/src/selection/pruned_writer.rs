use std::path::{Path, PathBuf};

use crate::{
    embeddings::{EmbeddingFormat, write_embedding_table},
    errors::WSResult,
    frequency::{FrequencyListOptions, encode_frequency_list},
    selection::Selection,
    utility::AtomicFile,
};

/// Paths and sizes of the artifacts written by [`PrunedArtifactWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedArtifacts {
    /// The pruned frequency list.
    pub frequency_path: PathBuf,

    /// The pruned embedding table.
    pub embedding_path: PathBuf,

    /// The number of tokens in each artifact.
    pub count: usize,

    /// The embedding dimensionality.
    pub dims: usize,
}

/// Writes the pruned frequency list and embedding table for a [`Selection`].
///
/// Both artifacts keep the selection's rank order. Neither becomes visible
/// until both have been written completely.
#[derive(Debug, Clone)]
pub struct PrunedArtifactWriter {
    /// Target path of the gzip frequency list.
    pub frequency_path: PathBuf,

    /// Target path of the embedding table.
    pub embedding_path: PathBuf,

    /// Frequency list format.
    pub frequency_options: FrequencyListOptions,

    /// Embedding table format.
    pub embedding_format: EmbeddingFormat,
}

impl PrunedArtifactWriter {
    /// Create a writer with default formats.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        frequency_path: P,
        embedding_path: Q,
    ) -> Self {
        Self {
            frequency_path: frequency_path.as_ref().to_path_buf(),
            embedding_path: embedding_path.as_ref().to_path_buf(),
            frequency_options: Default::default(),
            embedding_format: Default::default(),
        }
    }

    /// Set the frequency list format.
    pub fn with_frequency_options(
        self,
        frequency_options: FrequencyListOptions,
    ) -> Self {
        Self {
            frequency_options,
            ..self
        }
    }

    /// Set the embedding table format.
    pub fn with_embedding_format(
        self,
        embedding_format: EmbeddingFormat,
    ) -> Self {
        Self {
            embedding_format,
            ..self
        }
    }

    /// Write both artifacts.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, selection)))]
    pub fn write(
        &self,
        selection: &Selection,
    ) -> WSResult<PrunedArtifacts> {
        let frequency_file = encode_frequency_list(
            AtomicFile::create(&self.frequency_path)?,
            selection.frequency_entries(),
            &self.frequency_options,
        )?;

        let mut embedding_file = AtomicFile::create(&self.embedding_path)?;
        let count = write_embedding_table(
            &mut embedding_file,
            self.embedding_format,
            selection.dims,
            selection.embedding_records(),
        )?;

        let frequency_path = frequency_file.commit()?;
        let embedding_path = embedding_file.commit()?;

        log::info!(
            "wrote {count} pruned entries to {} and {}",
            frequency_path.display(),
            embedding_path.display()
        );

        Ok(PrunedArtifacts {
            frequency_path,
            embedding_path,
            count,
            dims: selection.dims,
        })
    }
}
