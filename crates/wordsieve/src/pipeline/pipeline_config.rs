use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    embeddings::EmbeddingFormat,
    errors::{WSResult, WordsieveError},
    frequency::{DEFAULT_FREQUENCY_DELIMITER, FrequencyListOptions},
    selection::TokenSelectorOptions,
};

/// An external command run after the pipeline publishes its artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// The program to run.
    pub command: String,

    /// Arguments placed before the engine document path.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Config for [`PipelineOrchestrator`](crate::pipeline::PipelineOrchestrator).
///
/// ```json
/// {
///   "frequencies": "~/corpora/fi/freqs.txt.gz",
///   "embeddings": "$VECTORS_DIR/fi.bin",
///   "output_dir": "build/fi",
///   "vocab_size": 200000,
///   "engine": { "command": "train-model", "args": ["--lang", "fi"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// The full frequency list.
    pub frequencies: PathBuf,

    /// The full embedding table.
    pub embeddings: PathBuf,

    /// Layout of the embedding table; also used for the pruned table.
    #[serde(default)]
    pub embedding_format: EmbeddingFormat,

    /// Token/count delimiter of the frequency lists.
    #[serde(default = "default_frequency_delimiter")]
    pub frequency_delimiter: char,

    /// Directory the artifacts are published to.
    pub output_dir: PathBuf,

    /// Maximum number of selected tokens.
    pub vocab_size: usize,

    /// Run independent reader passes concurrently.
    #[serde(default)]
    pub parallel: bool,

    /// Optional engine hand-off.
    #[serde(default)]
    pub engine: Option<EngineConfig>,
}

fn default_frequency_delimiter() -> char {
    DEFAULT_FREQUENCY_DELIMITER
}

impl PipelineConfig {
    /// Create a config with default formats and no engine.
    pub fn new<P, Q, R>(
        frequencies: P,
        embeddings: Q,
        output_dir: R,
        vocab_size: usize,
    ) -> Self
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        Self {
            frequencies: frequencies.as_ref().to_path_buf(),
            embeddings: embeddings.as_ref().to_path_buf(),
            embedding_format: Default::default(),
            frequency_delimiter: DEFAULT_FREQUENCY_DELIMITER,
            output_dir: output_dir.as_ref().to_path_buf(),
            vocab_size,
            parallel: false,
            engine: None,
        }
    }

    /// Set the embedding format.
    pub fn with_embedding_format(
        self,
        embedding_format: EmbeddingFormat,
    ) -> Self {
        Self {
            embedding_format,
            ..self
        }
    }

    /// Set the frequency list delimiter.
    pub fn with_frequency_delimiter(
        self,
        frequency_delimiter: char,
    ) -> Self {
        Self {
            frequency_delimiter,
            ..self
        }
    }

    /// Enable or disable concurrent reader passes.
    pub fn with_parallel(
        self,
        parallel: bool,
    ) -> Self {
        Self { parallel, ..self }
    }

    /// Set the engine hand-off.
    pub fn with_engine(
        self,
        engine: Option<EngineConfig>,
    ) -> Self {
        Self { engine, ..self }
    }

    /// Load, expand, and validate a JSON config document.
    ///
    /// Relative paths are resolved against the document's directory.
    pub fn load_path<P: AsRef<Path>>(path: P) -> WSResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            WordsieveError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        Self::from_json(&text, base_dir).map_err(|e| match e {
            WordsieveError::InvalidConfig(msg) => {
                WordsieveError::InvalidConfig(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse, expand, and validate a JSON config document.
    pub fn from_json(
        text: &str,
        base_dir: &Path,
    ) -> WSResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| WordsieveError::InvalidConfig(e.to_string()))?;
        let config = config.resolve_paths(base_dir)?;
        config.validate()?;
        Ok(config)
    }

    /// Expand `~` and environment variables in every path, and join relative
    /// paths onto `base_dir`.
    pub fn resolve_paths(
        self,
        base_dir: &Path,
    ) -> WSResult<Self> {
        Ok(Self {
            frequencies: expand_path(&self.frequencies, base_dir)?,
            embeddings: expand_path(&self.embeddings, base_dir)?,
            output_dir: expand_path(&self.output_dir, base_dir)?,
            ..self
        })
    }

    /// Check the config.
    ///
    /// ## Errors
    /// [`WordsieveError::InvalidConfig`] naming the first problem found.
    pub fn validate(&self) -> WSResult<()> {
        let invalid = |msg: String| Err(WordsieveError::InvalidConfig(msg));

        for (name, path) in [
            ("frequencies", &self.frequencies),
            ("embeddings", &self.embeddings),
        ] {
            if !path.is_file() {
                return invalid(format!("{name}: no such file: {}", path.display()));
            }
        }
        if self.output_dir.file_name().is_none() {
            return invalid(format!(
                "output_dir must name a directory: {}",
                self.output_dir.display()
            ));
        }
        if self.vocab_size == 0 {
            return invalid("vocab_size must be greater than 0".to_string());
        }
        if matches!(self.frequency_delimiter, '\n' | '\r') {
            return invalid(format!(
                "frequency_delimiter {:?} cannot be a line break",
                self.frequency_delimiter
            ));
        }
        if let Some(engine) = &self.engine
            && engine.command.trim().is_empty()
        {
            return invalid("engine.command is empty".to_string());
        }
        Ok(())
    }

    /// Frequency list options for the input and pruned lists.
    pub fn frequency_options(&self) -> FrequencyListOptions {
        FrequencyListOptions::default().with_delimiter(self.frequency_delimiter)
    }

    /// Selector options.
    pub fn selector_options(&self) -> TokenSelectorOptions {
        TokenSelectorOptions::new(self.vocab_size).with_parallel(self.parallel)
    }
}

fn expand_path(
    path: &Path,
    base_dir: &Path,
) -> WSResult<PathBuf> {
    let raw = path.to_str().ok_or_else(|| {
        WordsieveError::InvalidConfig(format!("path is not valid UTF-8: {}", path.display()))
    })?;
    let expanded = shellexpand::full(raw)
        .map_err(|e| WordsieveError::InvalidConfig(format!("cannot expand {raw:?}: {e}")))?;

    let expanded = PathBuf::from(expanded.as_ref());
    if expanded.is_relative() {
        Ok(base_dir.join(expanded))
    } else {
        Ok(expanded)
    }
}
