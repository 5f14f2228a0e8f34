use std::io::{BufWriter, StdoutLock, Write};

use wordsieve::utility::AtomicFile;

/// Output argument group.
#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Optional output file; "-" or no value writes to stdout.
    #[clap(long, short = 'o', default_value = None)]
    pub output: Option<String>,
}

impl OutputArgs {
    /// The output file path, if any.
    pub fn path(&self) -> Option<&str> {
        match self.output.as_deref() {
            Some("-") | None => None,
            Some(p) => Some(p),
        }
    }

    /// Open a writer for the output.
    ///
    /// A file output appears at its path only after [`OutputWriter::finish`].
    pub fn open_writer(&self) -> Result<OutputWriter, Box<dyn std::error::Error>> {
        Ok(match self.path() {
            Some(p) => OutputWriter::File(AtomicFile::create(p)?),
            None => OutputWriter::Stdout(BufWriter::new(std::io::stdout().lock())),
        })
    }
}

/// A writer for [`OutputArgs`].
pub enum OutputWriter {
    /// Buffered stdout.
    Stdout(BufWriter<StdoutLock<'static>>),

    /// A file published on [`OutputWriter::finish`].
    File(AtomicFile),
}

impl OutputWriter {
    /// Flush stdout, or publish the output file.
    pub fn finish(self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Self::Stdout(mut writer) => writer.flush()?,
            Self::File(file) => {
                file.commit()?;
            }
        }
        Ok(())
    }
}

impl Write for OutputWriter {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> std::io::Result<usize> {
        match self {
            Self::Stdout(writer) => writer.write(buf),
            Self::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File(file) => file.flush(),
        }
    }
}
