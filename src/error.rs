use std::fmt::{self, Display};

use crate::dom::TextPosition;

/// Error raised by scanning, parsing, or formatting.
///
/// Scanner and parser errors carry the position of the offending input.
/// Emitter errors (internal invariant breaks) have no position.
///
/// # Example
///
/// ```rust
/// use neatjson::Formatter;
///
/// let mut formatter = Formatter::new();
/// match formatter.reformat("{ nope }", 0) {
///     Ok(text) => println!("{text}"),
///     Err(e) => {
///         eprintln!("{e}");
///         if let Some(pos) = e.position {
///             eprintln!("at row {}, column {}", pos.row, pos.column);
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FormatError {
    /// Human-readable message, with the location appended when known.
    pub message: String,

    /// Where in the input the problem was detected, if anywhere.
    pub position: Option<TextPosition>,
}

impl FormatError {
    pub fn at(message: impl Into<String>, position: TextPosition) -> Self {
        let message = format!(
            "{} at idx={}, row={}, col={}",
            message.into(),
            position.index,
            position.row,
            position.column
        );
        Self { message, position: Some(position) }
    }

    pub fn plain(message: impl Into<String>) -> Self {
        Self { message: message.into(), position: None }
    }
}

impl Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FormatError {}
