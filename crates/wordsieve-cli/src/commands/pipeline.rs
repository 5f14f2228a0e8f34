use std::path::PathBuf;

use wordsieve::pipeline::PipelineOrchestrator;

use crate::{LogArgs, logging::DEFAULT_VERBOSITY};

/// Args for the pipeline command.
#[derive(clap::Args, Debug)]
pub struct PipelineArgs {
    /// JSON pipeline config.
    config: PathBuf,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl PipelineArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(DEFAULT_VERBOSITY)?;

        let orchestrator = PipelineOrchestrator::load_path(&self.config)?;
        let report = orchestrator.run()?;

        log::info!(
            "{} of {} tokens selected ({} covered, {} dims)",
            report.selected,
            orchestrator.config().vocab_size,
            report.covered,
            report.dims
        );
        log::info!("{} lexical records", report.lexical_records);
        log::info!(
            "selection: {:.2?}, lexical data: {:.2?}",
            report.selection_time,
            report.lexical_time
        );
        if let Some(engine_time) = report.engine_time {
            log::info!("engine: {engine_time:.2?}");
        }
        log::info!("artifacts: {}", report.artifacts.root.display());

        Ok(())
    }
}
