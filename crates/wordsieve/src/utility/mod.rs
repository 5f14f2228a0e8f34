//! # Utilities

pub mod atomic_file;
pub mod compression;
pub mod timers;

#[doc(inline)]
pub use atomic_file::*;
#[doc(inline)]
pub use compression::*;
#[doc(inline)]
pub use timers::*;
