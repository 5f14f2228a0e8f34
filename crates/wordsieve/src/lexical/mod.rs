//! # Lexical Data
//!
//! Lexical data joins the full frequency list against the selected vocabulary,
//! producing one [`LexicalRecord`] per known token:
//!
//! ```terminaloutput
//! {"token":"kissa","rank":1,"count":100,"probability":0.37037037037037035,"is_selected":true}
//! {"token":"koira","rank":2,"count":90,"probability":0.3333333333333333,"is_selected":false}
//! {"token":"talo","rank":3,"count":80,"probability":0.2962962962962963,"is_selected":true}
//! ```
//!
//! Probabilities are normalized over the entire list, selected or not.

mod lexical_data_builder;
mod lexical_record;

#[doc(inline)]
pub use lexical_data_builder::*;
#[doc(inline)]
pub use lexical_record::*;
