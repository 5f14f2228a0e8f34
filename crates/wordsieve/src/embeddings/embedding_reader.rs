use std::{
    io::{BufRead, ErrorKind},
    path::{Path, PathBuf},
};

use crate::{
    embeddings::{EmbeddingFormat, EmbeddingHeader, EmbeddingRecord, EmbeddingTable},
    errors::{WSResult, WordsieveError},
    utility::{InputStream, open_input_path},
};

/// A restartable source of [`EmbeddingRecord`]s.
///
/// Every call to [`EmbeddingSource::open_records`] starts a fresh pass.
pub trait EmbeddingSource {
    /// The record iterator for one pass.
    type Records<'a>: Iterator<Item = WSResult<EmbeddingRecord>>
    where
        Self: 'a;

    /// Start a new pass; returns the table header and the record stream.
    fn open_records(&self) -> WSResult<(EmbeddingHeader, Self::Records<'_>)>;
}

/// An embedding table file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingTableFile {
    /// Path to the file.
    pub path: PathBuf,

    /// The table layout.
    pub format: EmbeddingFormat,
}

impl EmbeddingTableFile {
    /// Create a source for a table in `format`.
    pub fn new<P: AsRef<Path>>(
        path: P,
        format: EmbeddingFormat,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }
}

impl EmbeddingSource for EmbeddingTableFile {
    type Records<'a>
        = EmbeddingRecords<InputStream>
    where
        Self: 'a;

    fn open_records(&self) -> WSResult<(EmbeddingHeader, Self::Records<'_>)> {
        let reader = open_input_path(&self.path)?;
        let records = EmbeddingRecords::with_source_name(reader, self.format, self.path.display())?;
        Ok((records.header(), records))
    }
}

fn clone_ok<T: Clone>(t: &T) -> WSResult<T> {
    Ok(t.clone())
}

impl EmbeddingSource for EmbeddingTable {
    type Records<'a>
        = core::iter::Map<
        core::slice::Iter<'a, EmbeddingRecord>,
        fn(&EmbeddingRecord) -> WSResult<EmbeddingRecord>,
    >
    where
        Self: 'a;

    fn open_records(&self) -> WSResult<(EmbeddingHeader, Self::Records<'_>)> {
        Ok((
            self.header(),
            self.records
                .iter()
                .map(clone_ok as fn(&EmbeddingRecord) -> _),
        ))
    }
}

/// Streaming reader over an embedding table.
///
/// The header is parsed on construction; records are then decoded lazily,
/// one at a time, until the declared count is reached.
pub struct EmbeddingRecords<R> {
    reader: R,
    format: EmbeddingFormat,
    header: EmbeddingHeader,
    source_name: String,
    emitted: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> EmbeddingRecords<R> {
    /// Read the header from `reader`.
    pub fn new(
        reader: R,
        format: EmbeddingFormat,
    ) -> WSResult<Self> {
        Self::with_source_name(reader, format, "<stream>")
    }

    /// Read the header from `reader`; `source_name` is used in error locations.
    pub fn with_source_name<S: ToString>(
        mut reader: R,
        format: EmbeddingFormat,
        source_name: S,
    ) -> WSResult<Self> {
        let source_name = source_name.to_string();
        let header = read_header(&mut reader, &source_name)?;
        log::debug!(
            "{source_name}: {} records x {} dims ({format})",
            header.count,
            header.dims
        );

        Ok(Self {
            reader,
            format,
            header,
            source_name,
            emitted: 0,
            buf: Vec::with_capacity(header.dims * size_of::<f32>()),
            done: false,
        })
    }

    /// The table header.
    pub fn header(&self) -> EmbeddingHeader {
        self.header
    }

    fn malformed<M: std::fmt::Display>(
        &self,
        message: M,
    ) -> WordsieveError {
        WordsieveError::malformed(
            format_args!("{}#{}", self.source_name, self.emitted + 1),
            message,
        )
    }

    fn premature_end(&self) -> WordsieveError {
        self.malformed(format_args!(
            "table ended after {} of {} declared records",
            self.emitted, self.header.count
        ))
    }

    fn decode_token(
        &self,
        bytes: &[u8],
    ) -> WSResult<String> {
        if bytes.is_empty() {
            return Err(self.malformed("empty token"));
        }
        if bytes.iter().any(u8::is_ascii_whitespace) {
            return Err(self.malformed(format_args!(
                "token {:?} contains whitespace",
                String::from_utf8_lossy(bytes)
            )));
        }
        String::from_utf8(bytes.to_vec())
            .map_err(|e| self.malformed(format_args!("token is not valid UTF-8: {e}")))
    }

    fn read_binary_record(&mut self) -> WSResult<EmbeddingRecord> {
        // Records may be separated by a trailing newline.
        loop {
            let first = self.reader.fill_buf()?.first().copied();
            match first {
                None => return Err(self.premature_end()),
                Some(b'\n') => self.reader.consume(1),
                Some(_) => break,
            }
        }

        self.buf.clear();
        self.reader.read_until(b' ', &mut self.buf)?;
        if self.buf.pop() != Some(b' ') {
            return Err(self.premature_end());
        }
        let token = self.decode_token(&self.buf)?;

        self.buf.resize(self.header.dims * size_of::<f32>(), 0);
        if let Err(e) = self.reader.read_exact(&mut self.buf) {
            return Err(match e.kind() {
                ErrorKind::UnexpectedEof => self.malformed(format_args!(
                    "vector for {token:?} is truncated; expected {} floats",
                    self.header.dims
                )),
                _ => e.into(),
            });
        }

        let vector = self
            .buf
            .chunks_exact(size_of::<f32>())
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(EmbeddingRecord { token, vector })
    }

    fn read_text_record(&mut self) -> WSResult<EmbeddingRecord> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Err(self.premature_end());
        }

        let line = std::str::from_utf8(&self.buf)
            .map_err(|e| self.malformed(format_args!("record is not valid UTF-8: {e}")))?;
        let mut fields = line.split_ascii_whitespace();

        let token = fields.next().unwrap_or_default();
        let token = self.decode_token(token.as_bytes())?;

        let mut vector = Vec::with_capacity(self.header.dims);
        for field in fields {
            let value = field.parse::<f32>().map_err(|e| {
                self.malformed(format_args!("invalid component {field:?} for {token:?}: {e}"))
            })?;
            vector.push(value);
        }

        if vector.len() != self.header.dims {
            return Err(self.malformed(format_args!(
                "vector for {token:?} has {} components, expected {}",
                vector.len(),
                self.header.dims
            )));
        }

        Ok(EmbeddingRecord { token, vector })
    }
}

impl<R: BufRead> Iterator for EmbeddingRecords<R> {
    type Item = WSResult<EmbeddingRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.emitted == self.header.count {
            return None;
        }

        let res = match self.format {
            EmbeddingFormat::Binary => self.read_binary_record(),
            EmbeddingFormat::Text => self.read_text_record(),
        };

        match res {
            Ok(_) => self.emitted += 1,
            Err(_) => self.done = true,
        }
        Some(res)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.header.count - self.emitted))
        }
    }
}

fn read_header<R: BufRead>(
    reader: &mut R,
    source_name: &str,
) -> WSResult<EmbeddingHeader> {
    let malformed = |message: &dyn std::fmt::Display| {
        WordsieveError::malformed(format_args!("{source_name}:header"), message)
    };

    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line)? == 0 {
        return Err(malformed(&"missing header"));
    }

    let text = std::str::from_utf8(&line).map_err(|_| malformed(&"header is not ASCII"))?;
    let fields: Vec<&str> = text.split_ascii_whitespace().collect();
    let [count, dims] = fields.as_slice() else {
        return Err(malformed(&format_args!(
            "expected `{{count}} {{dims}}`, found {:?}",
            text.trim_end()
        )));
    };

    let count = count
        .parse::<usize>()
        .map_err(|e| malformed(&format_args!("invalid record count {count:?}: {e}")))?;
    let dims = dims
        .parse::<usize>()
        .map_err(|e| malformed(&format_args!("invalid dimensionality {dims:?}: {e}")))?;
    if dims == 0 {
        return Err(malformed(&"dimensionality must be positive"));
    }

    Ok(EmbeddingHeader { count, dims })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn binary_table(
        header: &str,
        records: &[(&str, Vec<f32>)],
    ) -> Vec<u8> {
        let mut bytes = header.as_bytes().to_vec();
        for (token, vector) in records {
            bytes.extend_from_slice(token.as_bytes());
            bytes.push(b' ');
            for v in vector {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            bytes.push(b'\n');
        }
        bytes
    }

    fn read_all(
        bytes: Vec<u8>,
        format: EmbeddingFormat,
    ) -> WSResult<Vec<EmbeddingRecord>> {
        EmbeddingRecords::new(Cursor::new(bytes), format)?.collect()
    }

    #[test]
    fn test_read_binary() {
        let bytes = binary_table("2 3\n", &[
                ("kissa", vec![0.1, -2.5, 3.0]),
                ("talo", vec![1e-7, 0.0, -0.0]),
            ],
        );

        let records = EmbeddingRecords::new(Cursor::new(bytes), EmbeddingFormat::Binary).unwrap();
        assert_eq!(records.header(), EmbeddingHeader { count: 2, dims: 3 });

        let records = records.collect::<WSResult<Vec<_>>>().unwrap();
        assert_eq!(
            records,
            vec![
                EmbeddingRecord::new("kissa", vec![0.1, -2.5, 3.0]),
                EmbeddingRecord::new("talo", vec![1e-7, 0.0, -0.0]),
            ]
        );
    }

    #[test]
    fn test_binary_without_record_newlines() {
        let mut bytes = b"2 1\n".to_vec();
        bytes.extend_from_slice(b"a ");
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(b"b ");
        bytes.extend_from_slice(&(-1.5f32).to_le_bytes());

        let records = read_all(bytes, EmbeddingFormat::Binary).unwrap();
        assert_eq!(records[1], EmbeddingRecord::new("b", vec![-1.5]));
    }

    #[test]
    fn test_binary_fewer_records_than_declared() {
        let bytes = binary_table("3 2\n", &[("kissa", vec![1.0, 2.0])]);
        let err = read_all(bytes, EmbeddingFormat::Binary).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("1 of 3"), "{err}");
    }

    #[test]
    fn test_binary_truncated_vector() {
        let mut bytes = b"1 4\nkissa ".to_vec();
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&2.0f32.to_le_bytes());

        let err = read_all(bytes, EmbeddingFormat::Binary).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("truncated"), "{err}");
    }

    #[test]
    fn test_binary_token_with_whitespace() {
        for token in ["ki\tssa", "ki\x0cssa", "ki\rssa"] {
            let bytes = binary_table("1 1\n", &[(token, vec![1.0])]);
            let err = read_all(bytes, EmbeddingFormat::Binary).unwrap_err();
            assert!(err.is_malformed(), "{token:?}: {err}");
            assert!(err.to_string().contains("whitespace"), "{err}");
        }
    }

    #[test]
    fn test_trailing_data_ignored() {
        let mut bytes = binary_table("1 1\n", &[("a", vec![4.0])]);
        bytes.extend_from_slice(b"junk that is not a record");
        let records = read_all(bytes, EmbeddingFormat::Binary).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_bad_headers() {
        for header in ["", "300\n", "a b\n", "1 0\n", "1 2 3\n", "-1 5\n"] {
            let res = EmbeddingRecords::new(Cursor::new(header.as_bytes()), EmbeddingFormat::Binary);
            let err = res.err().unwrap_or_else(|| panic!("accepted {header:?}"));
            assert!(err.is_malformed(), "{header:?}: {err}");
        }
    }

    #[test]
    fn test_read_text() {
        let text = "2 2\nkissa 0.5 -1\ntalo 0.25 2.5 \n";
        let records = read_all(text.as_bytes().to_vec(), EmbeddingFormat::Text).unwrap();
        assert_eq!(
            records,
            vec![
                EmbeddingRecord::new("kissa", vec![0.5, -1.0]),
                EmbeddingRecord::new("talo", vec![0.25, 2.5]),
            ]
        );
    }

    #[test]
    fn test_text_dimension_mismatch() {
        let text = "2 2\nkissa 0.5 -1\ntalo 0.25\n";
        let err = read_all(text.as_bytes().to_vec(), EmbeddingFormat::Text).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("#2"), "{err}");
    }

    #[test]
    fn test_text_bad_component() {
        let text = "1 2\nkissa 0.5 x\n";
        let err = read_all(text.as_bytes().to_vec(), EmbeddingFormat::Text).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_streaming_stops_at_first_error() {
        let bytes = binary_table("3 1\n", &[("a", vec![1.0])]);
        let mut records = EmbeddingRecords::new(Cursor::new(bytes), EmbeddingFormat::Binary).unwrap();
        assert!(records.next().unwrap().is_ok());
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
    }

    #[test]
    fn test_in_memory_source() {
        let table = EmbeddingTable::new(1, vec![EmbeddingRecord::new("a", vec![1.0])]).unwrap();
        let (header, records) = table.open_records().unwrap();
        assert_eq!(header, EmbeddingHeader { count: 1, dims: 1 });
        assert_eq!(records.count(), 1);
    }
}
