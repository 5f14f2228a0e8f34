use std::{
    io::{BufRead, ErrorKind},
    path::{Path, PathBuf},
};

use crate::{
    errors::{WSResult, WordsieveError},
    frequency::{FrequencyEntry, FrequencyListOptions},
    types::Count,
    utility::{InputStream, open_input_path},
};

/// A restartable source of [`FrequencyEntry`] rows.
///
/// Every call to [`FrequencySource::open_entries`] starts a fresh pass,
/// yielding the same sequence in the same order.
pub trait FrequencySource {
    /// The entry iterator for one pass.
    type Entries<'a>: Iterator<Item = WSResult<FrequencyEntry>>
    where
        Self: 'a;

    /// Start a new pass over the entries.
    fn open_entries(&self) -> WSResult<Self::Entries<'_>>;
}

/// A frequency list file on disk; plain or gzip-compressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyListFile {
    /// Path to the file.
    pub path: PathBuf,

    /// Format options.
    pub options: FrequencyListOptions,
}

impl FrequencyListFile {
    /// Create a source with default options.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options: Default::default(),
        }
    }

    /// Set the format options.
    pub fn with_options(
        self,
        options: FrequencyListOptions,
    ) -> Self {
        Self { options, ..self }
    }
}

impl FrequencySource for FrequencyListFile {
    type Entries<'a>
        = FrequencyEntries<InputStream>
    where
        Self: 'a;

    fn open_entries(&self) -> WSResult<Self::Entries<'_>> {
        let reader = open_input_path(&self.path)?;
        Ok(FrequencyEntries::new(reader, self.options).with_source_name(self.path.display()))
    }
}

fn clone_ok<T: Clone>(t: &T) -> WSResult<T> {
    Ok(t.clone())
}

impl FrequencySource for [FrequencyEntry] {
    type Entries<'a>
        = core::iter::Map<
        core::slice::Iter<'a, FrequencyEntry>,
        fn(&FrequencyEntry) -> WSResult<FrequencyEntry>,
    >
    where
        Self: 'a;

    fn open_entries(&self) -> WSResult<Self::Entries<'_>> {
        Ok(self.iter().map(clone_ok as fn(&FrequencyEntry) -> _))
    }
}

impl FrequencySource for Vec<FrequencyEntry> {
    type Entries<'a>
        = <[FrequencyEntry] as FrequencySource>::Entries<'a>
    where
        Self: 'a;

    fn open_entries(&self) -> WSResult<Self::Entries<'_>> {
        self.as_slice().open_entries()
    }
}

/// Streaming parser over frequency list lines.
///
/// Each line must be `{TOKEN}{DELIMITER}{COUNT}`, with a non-empty token and
/// a non-negative integer count; blank lines are skipped. The first malformed line ends the stream
/// with [`WordsieveError::MalformedInput`].
pub struct FrequencyEntries<R> {
    reader: R,
    options: FrequencyListOptions,
    source_name: String,
    line_number: usize,
    buf: String,
    done: bool,
}

impl<R: BufRead> FrequencyEntries<R> {
    /// Parse entries from a buffered reader.
    pub fn new(
        reader: R,
        options: FrequencyListOptions,
    ) -> Self {
        Self {
            reader,
            options,
            source_name: "<stream>".to_string(),
            line_number: 0,
            buf: String::with_capacity(64),
            done: false,
        }
    }

    /// Set the name used in error locations.
    pub fn with_source_name<S: ToString>(
        self,
        source_name: S,
    ) -> Self {
        Self {
            source_name: source_name.to_string(),
            ..self
        }
    }

    fn malformed<M: std::fmt::Display>(
        &self,
        message: M,
    ) -> WordsieveError {
        WordsieveError::malformed(
            format_args!("{}:{}", self.source_name, self.line_number),
            message,
        )
    }

    fn parse_line(&self) -> WSResult<FrequencyEntry> {
        let line = self.buf.strip_suffix('\n').unwrap_or(self.buf.as_str());
        let line = line.strip_suffix('\r').unwrap_or(line);

        let delimiter = self.options.delimiter;
        let mut fields = line.split(delimiter);
        let (Some(token), Some(count), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(self.malformed(format_args!(
                "expected `token{}count`, found {line:?}",
                delimiter.escape_default()
            )));
        };

        if token.is_empty() {
            return Err(self.malformed("empty token"));
        }

        let count = count
            .parse::<Count>()
            .map_err(|e| self.malformed(format_args!("invalid count {count:?}: {e}")))?;

        Ok(FrequencyEntry::new(token, count))
    }
}

impl<R: BufRead> Iterator for FrequencyEntries<R> {
    type Item = WSResult<FrequencyEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let res = loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {
                    self.line_number += 1;
                    if self.buf.trim_end_matches(['\n', '\r']).is_empty() {
                        continue;
                    }
                    break self.parse_line();
                }
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    self.line_number += 1;
                    break Err(self.malformed(e));
                }
                Err(e) => break Err(e.into()),
            }
        };

        if res.is_err() {
            self.done = true;
        }
        Some(res)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use flate2::{Compression, write::GzEncoder};
    use tempdir::TempDir;

    use super::*;

    fn parse(text: &str) -> Vec<WSResult<FrequencyEntry>> {
        FrequencyEntries::new(Cursor::new(text.as_bytes()), Default::default()).collect()
    }

    #[test]
    fn test_parse_lines() {
        let entries = parse("kissa\t100\nkoira\t90\r\ntalo\t80")
            .into_iter()
            .collect::<WSResult<Vec<_>>>()
            .unwrap();

        assert_eq!(
            entries,
            vec![
                FrequencyEntry::new("kissa", 100),
                FrequencyEntry::new("koira", 90),
                FrequencyEntry::new("talo", 80),
            ]
        );
    }

    #[test]
    fn test_token_with_spaces() {
        let entries = parse("New York\t7\n")
            .into_iter()
            .collect::<WSResult<Vec<_>>>()
            .unwrap();
        assert_eq!(entries, vec![FrequencyEntry::new("New York", 7)]);
    }

    #[test]
    fn test_missing_count_is_malformed() {
        let results = parse("kissa\t100\ntalo\nkoira\t90\n");
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());

        let err = results[1].as_ref().unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("<stream>:2"), "{err}");
    }

    #[test]
    fn test_bad_counts_are_malformed() {
        for text in ["kissa\t-5\n", "kissa\tmany\n", "kissa\t\n", "\t5\n", "a\t1\t2\n"] {
            let results = parse(text);
            assert_eq!(results.len(), 1, "{text:?}");
            assert!(results[0].as_ref().unwrap_err().is_malformed(), "{text:?}");
        }
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let results = parse("kissa\t100\n\n\r\ntalo\n");
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());

        let err = results[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("<stream>:4"), "{err}");
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let bytes: &[u8] = b"kissa\t100\nk\xffssa\t90\n";
        let results: Vec<_> = FrequencyEntries::new(Cursor::new(bytes), Default::default()).collect();
        assert_eq!(results.len(), 2);
        assert!(results[1].as_ref().unwrap_err().is_malformed());
    }

    #[test]
    fn test_custom_delimiter() {
        let options = FrequencyListOptions::default().with_delimiter(' ');
        let entries = FrequencyEntries::new(Cursor::new("ja 12\n".as_bytes()), options)
            .collect::<WSResult<Vec<_>>>()
            .unwrap();
        assert_eq!(entries, vec![FrequencyEntry::new("ja", 12)]);
    }

    #[test]
    fn test_file_source_is_restartable() {
        let dir = TempDir::new("frequency_reader").unwrap();
        let path = dir.path().join("freqs.gz");

        let mut enc = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::fast());
        enc.write_all(b"ja\t30\non\t20\nei\t10\n").unwrap();
        enc.finish().unwrap();

        let source = FrequencyListFile::new(&path);
        let first = source
            .open_entries()
            .unwrap()
            .collect::<WSResult<Vec<_>>>()
            .unwrap();
        let second = source
            .open_entries()
            .unwrap()
            .collect::<WSResult<Vec<_>>>()
            .unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = FrequencyListFile::new("/nonexistent/wordsieve/freqs.gz");
        let err = source.open_entries().err().unwrap();
        assert!(matches!(err, WordsieveError::Io(_)));
    }

    #[test]
    fn test_vec_source() {
        let entries = vec![FrequencyEntry::new("a", 2), FrequencyEntry::new("b", 1)];
        let read = entries
            .open_entries()
            .unwrap()
            .collect::<WSResult<Vec<_>>>()
            .unwrap();
        assert_eq!(read, entries);
    }
}
