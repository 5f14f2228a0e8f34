use std::{io::Write, path::Path};

use crate::{
    embeddings::{EmbeddingFormat, EmbeddingHeader, EmbeddingRecord},
    errors::{WSResult, WordsieveError},
    utility::AtomicFile,
};

/// Write an embedding table header line.
pub fn write_embedding_header<W: Write>(
    writer: &mut W,
    header: &EmbeddingHeader,
) -> WSResult<()> {
    writeln!(writer, "{} {}", header.count, header.dims)?;
    Ok(())
}

/// Write one embedding record in `format`.
///
/// Binary vectors are written bit-exactly; text vectors use the shortest
/// representation which parses back to the same `f32`.
pub fn write_embedding_record<W: Write>(
    writer: &mut W,
    format: EmbeddingFormat,
    record: &EmbeddingRecord,
) -> WSResult<()> {
    match format {
        EmbeddingFormat::Binary => {
            writer.write_all(record.token.as_bytes())?;
            writer.write_all(b" ")?;
            for v in &record.vector {
                writer.write_all(&v.to_le_bytes())?;
            }
            writer.write_all(b"\n")?;
        }
        EmbeddingFormat::Text => {
            writer.write_all(record.token.as_bytes())?;
            for v in &record.vector {
                write!(writer, " {v}")?;
            }
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Write a complete embedding table.
///
/// The header count is taken from the length of `records`, so the record
/// iterator must report an exact size.
///
/// ## Returns
/// The number of records written.
pub fn write_embedding_table<'a, W, I>(
    writer: &mut W,
    format: EmbeddingFormat,
    dims: usize,
    records: I,
) -> WSResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a EmbeddingRecord>,
    I::IntoIter: ExactSizeIterator,
{
    let records = records.into_iter();
    let header = EmbeddingHeader {
        count: records.len(),
        dims,
    };
    write_embedding_header(writer, &header)?;

    for (idx, record) in records.enumerate() {
        check_writable(idx, record, dims)?;
        write_embedding_record(writer, format, record)?;
    }
    Ok(header.count)
}

/// Save an embedding table to `path`.
///
/// The file is published atomically; on error nothing is left at `path`.
pub fn save_embedding_table_path<'a, P, I>(
    path: P,
    format: EmbeddingFormat,
    dims: usize,
    records: I,
) -> WSResult<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a EmbeddingRecord>,
    I::IntoIter: ExactSizeIterator,
{
    let mut file = AtomicFile::create(path)?;
    let count = write_embedding_table(&mut file, format, dims, records)?;
    file.commit()?;
    Ok(count)
}

fn check_writable(
    idx: usize,
    record: &EmbeddingRecord,
    dims: usize,
) -> WSResult<()> {
    let location = || format!("record {}", idx + 1);

    if record.token.is_empty() || record.token.contains(|c: char| c.is_ascii_whitespace()) {
        return Err(WordsieveError::malformed(
            location(),
            format_args!("token {:?} cannot be encoded in an embedding table", record.token),
        ));
    }
    if record.vector.len() != dims {
        return Err(WordsieveError::malformed(
            location(),
            format_args!(
                "vector for {:?} has {} components, expected {dims}",
                record.token,
                record.vector.len()
            ),
        ));
    }
    Ok(())
}
