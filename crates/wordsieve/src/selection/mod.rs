//! # Vocabulary Selection
//!
//! [`TokenSelector`] walks a frequency list in rank order and keeps the first
//! `vocab_size` tokens which have an embedding vector. Coverage is a hard
//! filter: a frequent token without a vector is never selected.
//!
//! ```rust,no_run
//! use wordsieve::{
//!     embeddings::{EmbeddingFormat, EmbeddingTableFile},
//!     frequency::FrequencyListFile,
//!     selection::{PrunedArtifactWriter, TokenSelectorOptions},
//! };
//!
//! fn example() -> wordsieve::WSResult<()> {
//!     let selector = TokenSelectorOptions::new(200_000).init()?;
//!     let selection = selector.select(
//!         &FrequencyListFile::new("fi-freqs.tsv.gz"),
//!         &EmbeddingTableFile::new("cc.fi.300.bin", EmbeddingFormat::Binary),
//!     )?;
//!
//!     PrunedArtifactWriter::new("vocab/frequencies.gz", "vocab/vectors.bin")
//!         .write(&selection)?;
//!     Ok(())
//! }
//! ```

mod pruned_writer;
mod selection_set;
mod token_selector;

#[doc(inline)]
pub use pruned_writer::*;
#[doc(inline)]
pub use selection_set::*;
#[doc(inline)]
pub use token_selector::*;
