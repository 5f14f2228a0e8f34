use std::path::PathBuf;

use wordsieve::{
    embeddings::{EmbeddingFormat, EmbeddingTableFile},
    frequency::{FrequencyListFile, FrequencyListOptions},
    selection::{PrunedArtifactWriter, TokenSelectorOptions},
};

use crate::{LogArgs, commands::parse_delimiter, logging::DEFAULT_VERBOSITY};

/// Args for the select command.
#[derive(clap::Args, Debug)]
pub struct SelectArgs {
    /// Full frequency list; gzip or plain text.
    frequencies: PathBuf,

    /// Full embedding table.
    vectors: PathBuf,

    /// Output path for the pruned, gzip-compressed frequency list.
    out_frequencies: PathBuf,

    /// Output path for the pruned embedding table.
    out_vectors: PathBuf,

    /// Max number of selected tokens.
    #[arg(short = 'n', long)]
    count: usize,

    /// Embedding table layout; used for both input and output.
    #[arg(long, default_value_t = EmbeddingFormat::Binary)]
    format: EmbeddingFormat,

    /// Frequency list delimiter.
    #[arg(long, default_value = "tab", value_parser = parse_delimiter)]
    delimiter: char,

    /// Scan the frequency list and the embedding table concurrently.
    #[arg(long)]
    parallel: bool,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl SelectArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(DEFAULT_VERBOSITY)?;

        let options = FrequencyListOptions::default().with_delimiter(self.delimiter);
        let frequencies = FrequencyListFile::new(&self.frequencies).with_options(options);
        let embeddings = EmbeddingTableFile::new(&self.vectors, self.format);

        let selector = TokenSelectorOptions::new(self.count)
            .with_parallel(self.parallel)
            .init()?;
        let selection = selector.select(&frequencies, &embeddings)?;

        let pruned = PrunedArtifactWriter::new(&self.out_frequencies, &self.out_vectors)
            .with_frequency_options(options)
            .with_embedding_format(self.format)
            .write(&selection)?;

        log::info!(
            "selected {} tokens ({} dims); {} covered, {} entries scanned",
            pruned.count,
            pruned.dims,
            selection.covered,
            selection.scanned
        );

        Ok(())
    }
}
