use std::{
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{embeddings::EmbeddingFormat, errors::WSResult, utility::AtomicFile};

/// Vocabulary subdirectory of an output directory.
pub const VOCAB_DIR_NAME: &str = "vocab";

/// Pruned frequency list file name, under [`VOCAB_DIR_NAME`].
pub const PRUNED_FREQUENCIES_NAME: &str = "frequencies.gz";

/// Pruned embedding table stem, under [`VOCAB_DIR_NAME`].
pub const PRUNED_VECTORS_STEM: &str = "vectors";

/// Lexical data file name.
pub const LEXICAL_DATA_NAME: &str = "lexical_data.jsonl";

/// Engine hand-off document name.
pub const ENGINE_INPUTS_NAME: &str = "engine_inputs.json";

/// The artifact paths under one output directory.
///
/// ```text
/// <root>/
///   vocab/frequencies.gz
///   vocab/vectors.{bin,txt}
///   lexical_data.jsonl
///   engine_inputs.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineArtifacts {
    /// The output directory.
    pub root: PathBuf,

    /// The pruned frequency list.
    pub frequencies: PathBuf,

    /// The pruned embedding table.
    pub vectors: PathBuf,

    /// The lexical data.
    pub lexical_data: PathBuf,

    /// The engine hand-off document.
    pub engine_inputs: PathBuf,
}

impl PipelineArtifacts {
    /// Lay out the artifacts under `root`.
    pub fn under<P: AsRef<Path>>(
        root: P,
        format: EmbeddingFormat,
    ) -> Self {
        let root = root.as_ref().to_path_buf();
        let vocab = root.join(VOCAB_DIR_NAME);
        Self {
            frequencies: vocab.join(PRUNED_FREQUENCIES_NAME),
            vectors: vocab.join(format!("{PRUNED_VECTORS_STEM}.{}", format.extension())),
            lexical_data: root.join(LEXICAL_DATA_NAME),
            engine_inputs: root.join(ENGINE_INPUTS_NAME),
            root,
        }
    }

    /// The vocabulary subdirectory.
    pub fn vocab_dir(&self) -> PathBuf {
        self.root.join(VOCAB_DIR_NAME)
    }
}

/// The declarative hand-off document for the training engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineInputs {
    /// Absolute path of the pruned frequency list.
    pub frequencies: PathBuf,

    /// Absolute path of the pruned embedding table.
    pub vectors: PathBuf,

    /// Layout of the pruned embedding table.
    pub vectors_format: EmbeddingFormat,

    /// Absolute path of the lexical data.
    pub lexical_data: PathBuf,

    /// The requested vocabulary size.
    pub vocab_size: usize,

    /// The number of tokens actually selected.
    pub selected: usize,

    /// The embedding dimensionality.
    pub dims: usize,
}

impl EngineInputs {
    /// Save the document as pretty-printed JSON.
    pub fn save_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> WSResult<()> {
        let mut file = AtomicFile::create(path)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.commit()?;
        Ok(())
    }

    /// Load a saved document.
    pub fn load_path<P: AsRef<Path>>(path: P) -> WSResult<Self> {
        let reader = BufReader::new(std::fs::File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_layout() {
        let artifacts = PipelineArtifacts::under("/data/fi", EmbeddingFormat::Text);
        assert_eq!(artifacts.vocab_dir(), PathBuf::from("/data/fi/vocab"));
        assert_eq!(
            artifacts.frequencies,
            PathBuf::from("/data/fi/vocab/frequencies.gz")
        );
        assert_eq!(artifacts.vectors, PathBuf::from("/data/fi/vocab/vectors.txt"));
        assert_eq!(
            artifacts.lexical_data,
            PathBuf::from("/data/fi/lexical_data.jsonl")
        );
        assert_eq!(
            artifacts.engine_inputs,
            PathBuf::from("/data/fi/engine_inputs.json")
        );

        let binary = PipelineArtifacts::under("/data/fi", EmbeddingFormat::Binary);
        assert_eq!(binary.vectors, PathBuf::from("/data/fi/vocab/vectors.bin"));
    }

    #[test]
    fn test_engine_inputs_document() {
        let inputs = EngineInputs {
            frequencies: PathBuf::from("/out/vocab/frequencies.gz"),
            vectors: PathBuf::from("/out/vocab/vectors.bin"),
            vectors_format: EmbeddingFormat::Binary,
            lexical_data: PathBuf::from("/out/lexical_data.jsonl"),
            vocab_size: 200_000,
            selected: 2,
            dims: 300,
        };

        let dir = TempDir::new("engine_inputs").unwrap();
        let path = dir.path().join(ENGINE_INPUTS_NAME);
        inputs.save_path(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["vectors_format"], "binary");
        assert_eq!(value["selected"], 2);
        assert_eq!(value["lexical_data"], "/out/lexical_data.jsonl");

        assert_eq!(EngineInputs::load_path(&path).unwrap(), inputs);
    }
}
