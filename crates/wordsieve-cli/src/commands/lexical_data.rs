use std::path::PathBuf;

use wordsieve::{
    frequency::{FrequencyListFile, FrequencyListOptions},
    lexical::{LexicalDataBuilder, write_lexical_data},
};

use crate::{
    LogArgs,
    commands::parse_delimiter,
    input_output::OutputArgs,
    logging::DEFAULT_VERBOSITY,
};

/// Args for the lexical-data command.
#[derive(clap::Args, Debug)]
pub struct LexicalDataArgs {
    /// Full frequency list.
    full: PathBuf,

    /// Pruned frequency list; its tokens are the selected set.
    pruned: PathBuf,

    /// Frequency list delimiter, shared by both lists.
    #[arg(long, default_value = "tab", value_parser = parse_delimiter)]
    delimiter: char,

    /// Total the full list and load the pruned list concurrently.
    #[arg(long)]
    parallel: bool,

    #[command(flatten)]
    output: OutputArgs,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl LexicalDataArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(DEFAULT_VERBOSITY)?;

        let options = FrequencyListOptions::default().with_delimiter(self.delimiter);
        let full = FrequencyListFile::new(&self.full).with_options(options);
        let pruned = FrequencyListFile::new(&self.pruned).with_options(options);

        let builder = LexicalDataBuilder::from_pruned(&full, &pruned, self.parallel)?;
        if builder.selection().is_empty() {
            log::warn!("{} has no entries; nothing is selected", self.pruned.display());
        }
        let records = builder.build()?;

        if let Some(path) = self.output.path() {
            log::info!("output: {path}");
        }
        let mut writer = self.output.open_writer()?;
        let summary = write_lexical_data(&mut writer, records)?;
        writer.finish()?;

        log::info!(
            "wrote {} lexical records; {} selected",
            summary.records,
            summary.selected
        );

        Ok(())
    }
}
