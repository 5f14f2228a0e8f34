//! # Compressed Input Detection

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use flate2::bufread::MultiGzDecoder;

/// Leading bytes of a gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Boxed buffered input stream.
pub type InputStream = Box<dyn BufRead + Send>;

/// Wrap a buffered reader, transparently decompressing gzip input.
///
/// Detection peeks at the buffered bytes; nothing is consumed.
pub fn maybe_gunzip<R>(mut reader: R) -> std::io::Result<InputStream>
where
    R: BufRead + Send + 'static,
{
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    Ok(if is_gzip {
        Box::new(BufReader::new(MultiGzDecoder::new(reader)))
    } else {
        Box::new(reader)
    })
}

/// Open a (possibly gzip-compressed) file for buffered reading.
pub fn open_input_path<P: AsRef<Path>>(path: P) -> std::io::Result<InputStream> {
    maybe_gunzip(BufReader::new(File::open(path)?))
}
