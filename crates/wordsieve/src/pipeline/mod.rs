//! # Pipeline
//!
//! [`PipelineOrchestrator`] runs the vocabulary build from a single
//! [`PipelineConfig`]:
//!
//! 1. select the vocabulary and write the pruned frequency list and vectors;
//! 2. join the full frequency list against the selection into lexical data;
//! 3. write the [`EngineInputs`] hand-off document;
//! 4. publish the staged directory, then run the optional engine command.
//!
//! ```rust,no_run
//! use wordsieve::pipeline::PipelineOrchestrator;
//!
//! fn example() -> wordsieve::WSResult<()> {
//!     let report = PipelineOrchestrator::load_path("pipeline.json")?.run()?;
//!     println!("{} tokens in {}", report.selected, report.artifacts.root.display());
//!     Ok(())
//! }
//! ```

mod artifacts;
mod orchestrator;
mod pipeline_config;

#[doc(inline)]
pub use artifacts::*;
#[doc(inline)]
pub use orchestrator::*;
#[doc(inline)]
pub use pipeline_config::*;
