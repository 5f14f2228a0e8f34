//! # Embedding Tables
//!
//! Embedding tables use the `word2vec` layouts. Both begin with an ASCII
//! header line:
//!
//! ```terminaloutput
//! {RECORD COUNT} {DIMENSIONS}
//! ```
//!
//! * [`EmbeddingFormat::Binary`]: each record is the UTF-8 token, a single
//!   space, then `DIMENSIONS` little-endian `f32` values, and an optional `\n`.
//! * [`EmbeddingFormat::Text`]: each record is one line,
//!   `{TOKEN} {V1} {V2} ... {VN}`.
//!
//! Tables may be gigabytes in size; [`EmbeddingRecords`] streams them one
//! record at a time.

mod embedding_reader;
mod embedding_record;
mod embedding_writer;

#[doc(inline)]
pub use embedding_reader::*;
#[doc(inline)]
pub use embedding_record::*;
#[doc(inline)]
pub use embedding_writer::*;
