use std::{io::Write, path::PathBuf};

use wordsieve::embeddings::{EmbeddingFormat, EmbeddingSource, EmbeddingTableFile};

use crate::{LogArgs, logging::DEFAULT_VERBOSITY};

/// Args for the inspect command.
#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Embedding table.
    vectors: PathBuf,

    /// Embedding table layout.
    #[arg(long, default_value_t = EmbeddingFormat::Binary)]
    format: EmbeddingFormat,

    /// Number of records to print.
    #[arg(long, default_value = "10")]
    limit: usize,

    /// Number of vector components to print per record.
    #[arg(long, default_value = "4")]
    components: usize,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl InspectArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(DEFAULT_VERBOSITY)?;

        let table = EmbeddingTableFile::new(&self.vectors, self.format);
        let (header, records) = table.open_records()?;

        let mut out = std::io::stdout().lock();
        writeln!(out, "records: {}", header.count)?;
        writeln!(out, "dims: {}", header.dims)?;

        for (idx, record) in records.take(self.limit).enumerate() {
            let record = record?;
            let shown = self.components.min(record.vector.len());
            let head: Vec<String> = record.vector[..shown].iter().map(|v| format!("{v:.4}")).collect();
            let ellipsis = if shown < record.vector.len() { " ..." } else { "" };
            writeln!(out, "{:>6} {:<24} [{}{ellipsis}]", idx + 1, record.token, head.join(", "))?;
        }

        Ok(())
    }
}
