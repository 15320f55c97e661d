//! # neatjson
//!
//! A JSON (and JSONC) formatter built for human eyes. Output is still the
//! same data, but whitespace and line breaks are chosen by measuring each
//! container and picking the most readable shape that fits:
//!
//! - Small arrays and objects stay on a single line
//! - Arrays of many small values wrap several items per line
//! - Rows with similar structure line up as a table, column by column
//! - Everything else expands one element per line
//!
//! Comments and blank lines, when enabled, ride along with the element they
//! belong to.
//!
//! ## Quick start
//!
//! ```rust
//! use neatjson::Formatter;
//!
//! let input = r#"{"name":"Ada","scores":[95,87,92]}"#;
//! let mut formatter = Formatter::new();
//! println!("{}", formatter.reformat(input, 0).unwrap());
//! ```
//!
//! ## Formatting Rust values
//!
//! Anything implementing [`serde::Serialize`] can be formatted directly:
//!
//! ```rust
//! use neatjson::Formatter;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Reading {
//!     sensor: String,
//!     values: Vec<f64>,
//! }
//!
//! let reading = Reading { sensor: "a1".into(), values: vec![1.5, 2.25] };
//! let mut formatter = Formatter::new();
//! let text = formatter.serialize(&reading, 0, 100).unwrap();
//! assert!(text.contains("\"sensor\""));
//! ```
//!
//! ## Options
//!
//! All behavior is driven by [`FormatOptions`]:
//!
//! ```rust
//! use neatjson::{CommentPolicy, Formatter, NumberListAlignment};
//!
//! let mut formatter = Formatter::new();
//! formatter.options.max_total_line_length = 100;
//! formatter.options.comment_policy = CommentPolicy::Preserve;
//! formatter.options.number_list_alignment = NumberListAlignment::Decimal;
//!
//! let text = formatter
//!     .reformat("[1.5, 22.25, 3] // readings", 0)
//!     .unwrap();
//! assert!(text.contains("// readings"));
//! ```
//!
//! ## Example output
//!
//! Rows with matching structure align into a table:
//!
//! ```json
//! {
//!     "units": [
//!         { "kind": "turret",    "hp": 400, "pos": { "x": 47, "y": -4 } },
//!         { "kind": "assassin",  "hp":  80, "pos": { "x": 12, "y":  6 } },
//!         { "kind": "berserker", "hp": 150, "pos": { "x":  0, "y":  0 } }
//!     ]
//! }
//! ```
//!
//! The `neatjson` binary wraps all of this for the terminal; run
//! `neatjson --help`.

mod columns;
mod convert;
mod dom;
mod error;
mod formatter;
mod options;
mod pads;
mod parse;
mod scanner;
mod writer;

pub use crate::dom::{ElementKind, TextPosition};
pub use crate::error::FormatError;
pub use crate::formatter::Formatter;
pub use crate::options::{
    CommentPolicy, EolStyle, FormatOptions, NumberListAlignment, TableCommaPlacement,
};
