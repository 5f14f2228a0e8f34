//! # `wordsieve` Vocabulary Selection
//!
//! `wordsieve` prepares the vocabulary side of an NLP training run from two
//! large inputs: a frequency-ranked token list and a pretrained embedding
//! table.
//!
//! See:
//! * [`frequency`] to stream, rank, and write frequency lists.
//! * [`embeddings`] to stream and write `word2vec` embedding tables.
//! * [`selection`] to pick the top-N covered tokens and prune both inputs.
//! * [`lexical`] to derive per-token rank, probability, and selection flags.
//! * [`pipeline`] to run every stage from one config document.
//!
//! ## Crate Features
//!
//! #### feature: ``default``
//!
//! * ``ahash``
//! * ``rayon``
//!
//! #### feature: ``ahash``
//!
//! This swaps all HashMap/HashSet implementations for ``ahash``; which is a performance
//! win on many/(most?) modern CPUs.
//!
//! This is done by the ``types::WS{HashMap,HashSet}`` type alias machinery.
//!
//! #### feature: ``foldhash``
//!
//! The same, using ``foldhash``. If both are enabled, ``ahash`` wins.
//!
//! #### feature: ``rayon``
//!
//! Runs independent reader passes concurrently with ``rayon::join`` when the
//! caller asks for parallelism.
//!
//! #### feature: ``tracing``
//!
//! This enables a number of ``tracing`` instrumentation points.
//! This is only useful for timing tracing of the library itself.
//!
//! ## Selecting a Vocabulary
//!
//! ```rust,no_run
//! use wordsieve::embeddings::{EmbeddingFormat, EmbeddingTableFile};
//! use wordsieve::frequency::FrequencyListFile;
//! use wordsieve::lexical::{LexicalDataBuilder, write_lexical_data};
//! use wordsieve::selection::TokenSelectorOptions;
//!
//! fn example() -> wordsieve::WSResult<()> {
//!     let frequencies = FrequencyListFile::new("fi-freqs.tsv.gz");
//!     let embeddings = EmbeddingTableFile::new("fi-vectors.bin", EmbeddingFormat::Binary);
//!
//!     let selection = TokenSelectorOptions::new(200_000)
//!         .init()?
//!         .select(&frequencies, &embeddings)?;
//!
//!     let records = LexicalDataBuilder::new(&frequencies, selection.selection_set()).build()?;
//!     write_lexical_data(&mut std::io::stdout().lock(), records)?;
//!     Ok(())
//! }
//! ```
#![warn(missing_docs, unused)]

pub mod embeddings;
pub mod errors;
pub mod frequency;
pub mod lexical;
pub mod pipeline;
pub mod selection;
pub mod types;
pub mod utility;

#[doc(inline)]
pub use errors::{WSResult, WordsieveError};
