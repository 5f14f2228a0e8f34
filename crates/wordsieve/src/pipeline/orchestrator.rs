use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use crate::{
    embeddings::EmbeddingTableFile,
    errors::{WSResult, WordsieveError},
    frequency::FrequencyListFile,
    lexical::{LexicalDataBuilder, LexicalDataSummary, write_lexical_data},
    pipeline::{EngineConfig, EngineInputs, PipelineArtifacts, PipelineConfig},
    selection::{PrunedArtifactWriter, PrunedArtifacts},
    utility::{AtomicFile, log_stage, timeit},
};

/// Summary of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Where the artifacts were published.
    pub artifacts: PipelineArtifacts,

    /// The number of selected tokens.
    pub selected: usize,

    /// The number of covered tokens in the embedding table.
    pub covered: usize,

    /// The number of lexical data records.
    pub lexical_records: usize,

    /// The embedding dimensionality.
    pub dims: usize,

    /// Time spent selecting and writing the pruned vocabulary.
    pub selection_time: Duration,

    /// Time spent building lexical data.
    pub lexical_time: Duration,

    /// Time spent in the engine command, if one ran.
    pub engine_time: Option<Duration>,
}

/// Sequences the pipeline stages.
///
/// Artifacts are built in a staging directory, `<output_dir>.partial`, which
/// replaces `output_dir` only after every stage has succeeded.
#[derive(Debug, Clone)]
pub struct PipelineOrchestrator {
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    /// Validate `config` and build an orchestrator.
    pub fn new(config: PipelineConfig) -> WSResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Load a JSON config document and build an orchestrator.
    pub fn load_path<P: AsRef<Path>>(path: P) -> WSResult<Self> {
        Self::new(PipelineConfig::load_path(path)?)
    }

    /// The pipeline config.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The staging directory used while building.
    pub fn staging_dir(&self) -> PathBuf {
        let mut name = self
            .config
            .output_dir
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".partial");
        self.config.output_dir.with_file_name(name)
    }

    /// Run every stage and publish the artifacts.
    ///
    /// On failure, the staging directory is removed and no `output_dir` from
    /// this run exists. An engine failure is reported after publication.
    pub fn run(&self) -> WSResult<PipelineReport> {
        let staging = self.staging_dir();
        reset_dir(&staging)?;

        let built = self.build_into(&staging).and_then(|report| {
            publish(&staging, &self.config.output_dir)?;
            Ok(report)
        });
        let mut report = match built {
            Ok(report) => report,
            Err(err) => {
                if staging.exists()
                    && let Err(cleanup) = fs::remove_dir_all(&staging)
                {
                    log::warn!("failed to remove {}: {cleanup}", staging.display());
                }
                return Err(err);
            }
        };
        log::info!(
            "published {} selected tokens to {}",
            report.selected,
            report.artifacts.root.display()
        );

        if let Some(engine) = &self.config.engine {
            let (elapsed, ret) = timeit(|| run_engine(engine, &report.artifacts.engine_inputs));
            ret?;
            report.engine_time = Some(elapsed);
        }

        Ok(report)
    }

    fn build_into(
        &self,
        staging: &Path,
    ) -> WSResult<PipelineReport> {
        let config = &self.config;
        let format = config.embedding_format;
        let options = config.frequency_options();

        let staged = PipelineArtifacts::under(staging, format);
        let published = PipelineArtifacts::under(std::path::absolute(&config.output_dir)?, format);
        fs::create_dir_all(staged.vocab_dir())?;

        let frequencies = FrequencyListFile::new(&config.frequencies).with_options(options);
        let embeddings = EmbeddingTableFile::new(&config.embeddings, format);

        let (selection_time, (pruned, covered)) =
            log_stage("selection", || -> WSResult<(PrunedArtifacts, usize)> {
                let selection = config
                    .selector_options()
                    .init()?
                    .select(&frequencies, &embeddings)?;
                let pruned = PrunedArtifactWriter::new(&staged.frequencies, &staged.vectors)
                    .with_frequency_options(options)
                    .with_embedding_format(format)
                    .write(&selection)?;
                Ok((pruned, selection.covered))
            })?;

        let (lexical_time, lexical) = log_stage("lexical data", || -> WSResult<LexicalDataSummary> {
            let pruned_list = FrequencyListFile::new(&pruned.frequency_path).with_options(options);
            let records =
                LexicalDataBuilder::from_pruned(&frequencies, &pruned_list, config.parallel)?
                    .build()?;

            let mut file = AtomicFile::create(&staged.lexical_data)?;
            let summary = write_lexical_data(&mut file, records)?;
            file.commit()?;
            Ok(summary)
        })?;

        if lexical.selected != pruned.count {
            return Err(WordsieveError::malformed(
                staged.lexical_data.display(),
                format_args!(
                    "{} records are selected, but the pruned vocabulary has {}",
                    lexical.selected, pruned.count
                ),
            ));
        }

        EngineInputs {
            frequencies: published.frequencies.clone(),
            vectors: published.vectors.clone(),
            vectors_format: format,
            lexical_data: published.lexical_data.clone(),
            vocab_size: config.vocab_size,
            selected: pruned.count,
            dims: pruned.dims,
        }
        .save_path(&staged.engine_inputs)?;

        Ok(PipelineReport {
            artifacts: published,
            selected: pruned.count,
            covered,
            lexical_records: lexical.records,
            dims: pruned.dims,
            selection_time,
            lexical_time,
            engine_time: None,
        })
    }
}

fn reset_dir(dir: &Path) -> WSResult<()> {
    if dir.exists() {
        log::debug!("removing stale staging directory {}", dir.display());
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Replace `target` with `staging`.
fn publish(
    staging: &Path,
    target: &Path,
) -> WSResult<()> {
    if target.exists() {
        log::info!("replacing {}", target.display());
        fs::remove_dir_all(target)?;
    }
    fs::rename(staging, target)?;
    Ok(())
}

fn run_engine(
    engine: &EngineConfig,
    engine_inputs: &Path,
) -> WSResult<()> {
    log::info!(
        "running engine: {} {} {}",
        engine.command,
        engine.args.join(" "),
        engine_inputs.display()
    );

    let status = Command::new(&engine.command)
        .args(&engine.args)
        .arg(engine_inputs)
        .status()
        .map_err(|e| WordsieveError::External(format!("cannot run {:?}: {e}", engine.command)))?;

    if !status.success() {
        return Err(WordsieveError::External(format!(
            "engine {:?} failed: {status}",
            engine.command
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_staging_dir() {
        let config = PipelineConfig::new("f.gz", "v.bin", "/build/fi", 1);
        let orchestrator = PipelineOrchestrator { config };
        assert_eq!(
            orchestrator.staging_dir(),
            PathBuf::from("/build/fi.partial")
        );
    }

    #[test]
    fn test_publish_replaces_target() {
        let dir = TempDir::new("orchestrator").unwrap();
        let staging = dir.path().join("out.partial");
        let target = dir.path().join("out");

        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("stale.txt"), "old").unwrap();
        reset_dir(&staging).unwrap();
        fs::write(staging.join("fresh.txt"), "new").unwrap();

        publish(&staging, &target).unwrap();
        assert!(!staging.exists());
        assert!(!target.join("stale.txt").exists());
        assert_eq!(fs::read_to_string(target.join("fresh.txt")).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_exit_status() {
        let dir = TempDir::new("orchestrator").unwrap();
        let doc = dir.path().join(crate::pipeline::ENGINE_INPUTS_NAME);

        let ok = EngineConfig {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), "test -n \"$0\"".to_string()],
        };
        run_engine(&ok, &doc).unwrap();

        let failing = EngineConfig {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 3".to_string()],
        };
        let err = run_engine(&failing, &doc).unwrap_err();
        assert!(matches!(err, WordsieveError::External(_)), "{err}");

        let missing = EngineConfig {
            command: "wordsieve-no-such-engine".to_string(),
            args: vec![],
        };
        assert!(matches!(
            run_engine(&missing, &doc).unwrap_err(),
            WordsieveError::External(_)
        ));
    }
}
