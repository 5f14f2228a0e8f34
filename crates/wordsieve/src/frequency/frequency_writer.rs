use std::{io::Write, path::Path};

use flate2::{Compression, write::GzEncoder};

use crate::{
    errors::WSResult,
    frequency::{FrequencyEntry, FrequencyListOptions},
    utility::AtomicFile,
};

/// Write frequency entries as `{TOKEN}{DELIMITER}{COUNT}` lines.
///
/// ## Returns
/// The number of entries written.
pub fn write_frequency_entries<'a, W, I>(
    writer: &mut W,
    entries: I,
    options: &FrequencyListOptions,
) -> WSResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a FrequencyEntry>,
{
    let mut written = 0;
    for entry in entries {
        writeln!(writer, "{}{}{}", entry.token, options.delimiter, entry.count)?;
        written += 1;
    }
    Ok(written)
}

/// Write gzip-compressed frequency entries to `writer`.
///
/// ## Returns
/// The inner writer, after the gzip trailer has been written.
pub fn encode_frequency_list<'a, W, I>(
    writer: W,
    entries: I,
    options: &FrequencyListOptions,
) -> WSResult<W>
where
    W: Write,
    I: IntoIterator<Item = &'a FrequencyEntry>,
{
    let mut encoder = GzEncoder::new(writer, Compression::default());
    write_frequency_entries(&mut encoder, entries, options)?;
    Ok(encoder.finish()?)
}

/// Save a gzip-compressed frequency list to `path`.
///
/// The file is published atomically; on error nothing is left at `path`.
pub fn save_frequency_list_path<'a, P, I>(
    path: P,
    entries: I,
    options: &FrequencyListOptions,
) -> WSResult<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a FrequencyEntry>,
{
    let file = AtomicFile::create(path)?;
    encode_frequency_list(file, entries, options)?.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;
    use crate::frequency::{FrequencyListFile, FrequencySource};

    #[test]
    fn test_write_lines() {
        let entries = vec![FrequencyEntry::new("kissa", 100), FrequencyEntry::new("talo", 80)];

        let mut buf = Vec::new();
        let n = write_frequency_entries(&mut buf, &entries, &Default::default()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(String::from_utf8(buf).unwrap(), "kissa\t100\ntalo\t80\n");
    }

    #[test]
    fn test_save_load_frequency_list() {
        let entries = vec![
            FrequencyEntry::new("ja", 1882305),
            FrequencyEntry::new("on", 1537745),
            FrequencyEntry::new("New York", 3),
        ];
        let options = FrequencyListOptions::default();

        let dir = TempDir::new("frequency_writer").unwrap();
        let path = dir.path().join("freqs.gz");
        save_frequency_list_path(&path, &entries, &options).unwrap();

        let loaded = FrequencyListFile::new(&path)
            .with_options(options)
            .open_entries()
            .unwrap()
            .collect::<WSResult<Vec<_>>>()
            .unwrap();
        assert_eq!(loaded, entries);
    }
}
