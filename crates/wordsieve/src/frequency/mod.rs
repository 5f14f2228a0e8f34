//! # Frequency Lists
//!
//! A frequency list is a text table of `{TOKEN}{DELIMITER}{COUNT}` lines,
//! sorted by descending count, and usually gzip-compressed:
//!
//! ```terminaloutput
//! ja	1882305
//! on	1537745
//! ei	715133
//! ```
//!
//! ## Reading
//!
//! ```rust,no_run
//! use wordsieve::frequency::{FrequencyListFile, FrequencySource, ranked_entries};
//!
//! fn example() -> wordsieve::WSResult<()> {
//!     let source = FrequencyListFile::new("fi-freqs.tsv.gz");
//!     for item in ranked_entries(source.open_entries()?) {
//!         let (rank, entry) = item?;
//!         println!("{rank} {} {}", entry.token, entry.count);
//!     }
//!     Ok(())
//! }
//! ```

mod frequency_entry;
mod frequency_reader;
mod frequency_writer;
mod ranked_entries;

#[doc(inline)]
pub use frequency_entry::*;
#[doc(inline)]
pub use frequency_reader::*;
#[doc(inline)]
pub use frequency_writer::*;
#[doc(inline)]
pub use ranked_entries::*;
