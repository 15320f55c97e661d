/// Line ending written between output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EolStyle {
    /// Unix-style `\n`.
    Lf,
    /// Windows-style `\r\n`.
    Crlf,
}

/// What to do about comments in the input.
///
/// Standard JSON has no comments, but JSONC (VS Code configs and friends)
/// does. The scanner always recognizes them; this policy decides their fate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentPolicy {
    /// Any comment in the input is an error. The default.
    TreatAsError,
    /// Comments are dropped from the output.
    Remove,
    /// Comments are kept, attached to the element they visually belong to.
    Preserve,
}

/// How numbers line up within a table or compact-array column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberListAlignment {
    /// Values at the left edge of the column, padding after.
    Left,
    /// Values at the right edge of the column, padding before.
    Right,
    /// Values aligned on the decimal point (or its implied position for
    /// integers). Original digits are untouched.
    Decimal,
    /// Values rewritten with a common number of fractional digits, then
    /// decimal-aligned. Falls back to `Left` for columns this can't
    /// represent faithfully (exponents, overlong values, non-finite).
    Normalize,
}

/// Where a row's comma sits relative to the column padding in tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCommaPlacement {
    /// Comma hugs the value: `"ab",   `.
    BeforePadding,
    /// Comma comes after the padding, forming its own column: `"ab"   ,`.
    AfterPadding,
    /// `BeforePadding`, except number columns keep their decimal alignment
    /// by taking the comma after the padding.
    BeforePaddingExceptNumbers,
}

/// All the knobs.
///
/// `Default::default()` gives the recommended settings; adjust fields from
/// there.
///
/// ```rust
/// use neatjson::{FormatOptions, CommentPolicy};
///
/// let mut options = FormatOptions::default();
/// options.max_total_line_length = 100;
/// options.comment_policy = CommentPolicy::Preserve;
/// ```
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Line ending for output. Default: `Lf`.
    pub json_eol_style: EolStyle,

    /// Width budget for inline, compact, and table layouts. Default: 120.
    pub max_total_line_length: usize,

    /// Deepest nesting an array/object may have and still be written on
    /// one line. -1 disables inlining. Default: 2.
    pub max_inline_complexity: isize,

    /// Deepest nesting an array may have and still be written several
    /// items per line. -1 disables the compact layout. Default: 2.
    pub max_compact_array_complexity: isize,

    /// Deepest nesting a table row's value may have. -1 disables table
    /// layout. Default: 2.
    pub max_table_row_complexity: isize,

    /// Property-name alignment is skipped when the spread between the
    /// longest and shortest name exceeds this. Default: 16.
    pub max_prop_name_padding: usize,

    /// Minimum element count before an array is considered for the compact
    /// multi-line layout. Default: 3.
    pub min_compact_array_row_items: usize,

    /// Containers at this depth or shallower are always fully expanded.
    /// -1 disables the forcing. Default: -1.
    pub always_expand_depth: isize,

    /// Spaces per indent level (ignored with `use_tab_to_indent`).
    /// Default: 4.
    pub indent_spaces: usize,

    /// Indent with tabs instead of spaces. Default: false.
    pub use_tab_to_indent: bool,

    /// Text prepended to every output line, e.g. for embedding formatted
    /// JSON inside another document. Default: empty.
    pub prefix_string: String,

    /// Spaces inside brackets when some child is a container:
    /// `[ [1, 2] ]` vs `[[1, 2]]`. Default: true.
    pub nested_bracket_padding: bool,

    /// Spaces inside brackets when all children are scalars:
    /// `[ 1, 2 ]` vs `[1, 2]`. Default: true.
    pub simple_bracket_padding: bool,

    /// Space after the colon of a property. Default: true.
    pub colon_padding: bool,

    /// Space after commas. Default: true.
    pub comma_padding: bool,

    /// Space between an element and an attached comment. Default: true.
    pub comment_padding: bool,

    /// With name alignment, `"a":   1` (true) vs `"a"  : 1` (false).
    /// Default: false.
    pub colon_before_prop_name_padding: bool,

    /// Comma position in table rows.
    /// Default: `BeforePaddingExceptNumbers`.
    pub table_comma_placement: TableCommaPlacement,

    /// Number alignment in table and compact columns. Default: `Decimal`.
    pub number_list_alignment: NumberListAlignment,

    /// Comment handling. Default: `TreatAsError`.
    pub comment_policy: CommentPolicy,

    /// Keep blank lines from the input. Default: false.
    pub preserve_blank_lines: bool,

    /// Accept trailing commas in the input. Default: false.
    pub allow_trailing_commas: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            json_eol_style: EolStyle::Lf,
            max_total_line_length: 120,
            max_inline_complexity: 2,
            max_compact_array_complexity: 2,
            max_table_row_complexity: 2,
            max_prop_name_padding: 16,
            min_compact_array_row_items: 3,
            always_expand_depth: -1,
            indent_spaces: 4,
            use_tab_to_indent: false,
            prefix_string: String::new(),
            nested_bracket_padding: true,
            simple_bracket_padding: true,
            colon_padding: true,
            comma_padding: true,
            comment_padding: true,
            colon_before_prop_name_padding: false,
            table_comma_placement: TableCommaPlacement::BeforePaddingExceptNumbers,
            number_list_alignment: NumberListAlignment::Decimal,
            comment_policy: CommentPolicy::TreatAsError,
            preserve_blank_lines: false,
            allow_trailing_commas: false,
        }
    }
}
