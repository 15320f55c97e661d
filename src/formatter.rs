use std::rc::Rc;

use serde::Serialize;

use crate::columns::ColumnTemplate;
use crate::convert::element_from_value;
use crate::dom::{BracketMode, ColumnKind, Element, ElementKind};
use crate::error::FormatError;
use crate::options::{EolStyle, FormatOptions, TableCommaPlacement};
use crate::pads::{default_width_fn, Pads, WidthFn};
use crate::parse::Parser;
use crate::writer::LineWriter;

/// The formatter: parses input (or converts a live value) into the element
/// tree, then renders it back out with layout chosen per container.
///
/// A `Formatter` is cheap to keep around and reuse; each call owns all of
/// its working state. Instances are independent, so separate threads can
/// each use their own.
///
/// ```rust
/// use neatjson::Formatter;
///
/// let mut formatter = Formatter::new();
/// let text = formatter.reformat(r#"{"a":1,"b":2}"#, 0).unwrap();
/// assert_eq!(text, "{ \"a\": 1, \"b\": 2 }\n");
/// ```
pub struct Formatter {
    pub options: FormatOptions,
    width_fn: WidthFn,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self { options: FormatOptions::default(), width_fn: default_width_fn() }
    }

    /// Replace the string-width hook. The default counts code points;
    /// supply your own to account for e.g. double-width glyphs. All column
    /// arithmetic, including literals and indents, goes through the hook.
    pub fn set_string_width_fn(&mut self, width_fn: impl Fn(&str) -> usize + 'static) {
        self.width_fn = Rc::new(width_fn);
    }

    /// Parse `text` and render it with fresh layout. `starting_depth`
    /// indents the whole output, for embedding in an outer document.
    pub fn reformat(&mut self, text: &str, starting_depth: usize) -> Result<String, FormatError> {
        let parser = Parser::new(self.options.clone());
        let doc = parser.parse_document(text, true)?;
        self.render_document(doc, starting_depth)
    }

    /// Format any serializable value directly. Conversion is depth-bounded
    /// by `recursion_limit` and fails fast when the bound is exhausted.
    pub fn serialize<T: Serialize>(
        &mut self,
        value: &T,
        starting_depth: usize,
        recursion_limit: usize,
    ) -> Result<String, FormatError> {
        let json = serde_json::to_value(value)
            .map_err(|e| FormatError::plain(format!("Value is not serializable: {e}")))?;
        let element = element_from_value(&json, None, recursion_limit)?;
        self.render_document(vec![element], starting_depth)
    }

    /// Strip all optional whitespace, keeping comments and blank lines
    /// according to the current policy.
    pub fn minify(&mut self, text: &str) -> Result<String, FormatError> {
        let parser = Parser::new(self.options.clone());
        let doc = parser.parse_document(text, true)?;

        let eol = match self.options.json_eol_style {
            EolStyle::Crlf => "\r\n",
            EolStyle::Lf => "\n",
        };
        let mut out = LineWriter::new();
        for element in &doc {
            match element.kind {
                ElementKind::BlankLine => {
                    if out.line_in_progress() {
                        out.end_line(eol);
                    }
                    out.end_line(eol);
                }
                ElementKind::LineComment => {
                    out.add(&element.value).end_line(eol);
                }
                ElementKind::BlockComment => {
                    out.add(&element.value);
                }
                _ => minify_value(&mut out, element, false, eol),
            }
        }
        Ok(out.into_string())
    }

    fn render_document(
        &mut self,
        doc: Vec<Element>,
        starting_depth: usize,
    ) -> Result<String, FormatError> {
        let pads = Rc::new(Pads::new(&self.options, Rc::clone(&self.width_fn)));
        let mut emitter = Emitter { options: &self.options, pads, out: LineWriter::new() };
        for mut element in doc {
            compute_widths(&mut element, &emitter.pads);
            emitter.format_element(&element, starting_depth, false, 0)?;
        }
        Ok(emitter.out.into_string())
    }
}

/// Post-order measurement pass: fills every width field and decides which
/// subtrees can never fit on one line.
pub(crate) fn compute_widths(element: &mut Element, pads: &Pads) {
    for child in &mut element.children {
        compute_widths(child, pads);
    }

    element.name_width = pads.width_of(&element.name);
    element.prefix_comment_width = pads.width_of(&element.prefix_comment);
    element.middle_comment_width = pads.width_of(&element.middle_comment);
    element.postfix_comment_width = pads.width_of(&element.postfix_comment);

    element.value_width = match element.kind {
        ElementKind::Null => pads.null_width(),
        ElementKind::True => pads.true_width(),
        ElementKind::False => pads.false_width(),
        ElementKind::Array | ElementKind::Object => {
            let mode = bracket_mode(element);
            pads.open_width(element.kind, mode)
                + pads.close_width(element.kind, mode)
                + element
                    .children
                    .iter()
                    .map(|c| c.minimum_total_width)
                    .sum::<usize>()
                + pads.comma_width() * element.children.len().saturating_sub(1)
        }
        _ => pads.width_of(&element.value),
    };

    element.requires_multiple_lines = match element.kind {
        ElementKind::BlankLine | ElementKind::LineComment => true,
        ElementKind::BlockComment => element.value.contains('\n'),
        _ => {
            element.middle_comment_has_newline
                || element.children.iter().any(|c| {
                    c.requires_multiple_lines
                        || c.is_post_comment_line_style
                        || c.kind.is_commentish()
                })
        }
    };

    let with_pad = |width: usize, pad: usize| if width > 0 { width + pad } else { 0 };
    element.minimum_total_width = with_pad(element.prefix_comment_width, pads.comment_width())
        + with_pad(element.name_width, pads.colon_width())
        + with_pad(element.middle_comment_width, pads.comment_width())
        + element.value_width
        + with_pad(element.postfix_comment_width, pads.comment_width());
}

/// Bracket spacing class for a container: empty, all-scalar, or holding at
/// least one non-empty container.
fn bracket_mode(element: &Element) -> BracketMode {
    if element.children.is_empty() {
        BracketMode::Empty
    } else if element.complexity >= 2 {
        BracketMode::Complex
    } else {
        BracketMode::Simple
    }
}

/// How a table row's postfix-comment column interacts with its comma.
#[derive(Clone, Copy, PartialEq, Eq)]
enum PostfixColumn {
    /// No comments in this column; the value segment owns the comma.
    Absent,
    /// Some row has a `//` comment, so every comma must come before the
    /// comments to stay lexically valid and vertically aligned.
    CommaThenComment,
    /// Only block comments; the commas line up after them.
    CommentThenComma,
}

struct Emitter<'a> {
    options: &'a FormatOptions,
    pads: Rc<Pads>,
    out: LineWriter,
}

impl Emitter<'_> {
    fn format_element(
        &mut self,
        element: &Element,
        depth: usize,
        include_comma: bool,
        name_pad: usize,
    ) -> Result<(), FormatError> {
        match element.kind {
            ElementKind::BlankLine => {
                self.write_blank_line();
                Ok(())
            }
            ElementKind::LineComment | ElementKind::BlockComment => {
                self.write_standalone_comment(element, depth);
                Ok(())
            }
            _ if element.middle_comment_has_newline => {
                self.format_with_split_middle_comment(element, depth, include_comma)
            }
            ElementKind::Array | ElementKind::Object => {
                self.format_container(element, depth, include_comma, name_pad)
            }
            _ => {
                self.line_start(depth);
                self.write_inline_element(element, include_comma, name_pad)?;
                self.out.end_line(self.pads.eol());
                Ok(())
            }
        }
    }

    fn format_container(
        &mut self,
        element: &Element,
        depth: usize,
        include_comma: bool,
        name_pad: usize,
    ) -> Result<(), FormatError> {
        if depth as isize > self.options.always_expand_depth {
            if self.try_inline(element, depth, include_comma, name_pad)? {
                return Ok(());
            }
            if self.try_compact_array(element, depth, include_comma, name_pad)? {
                return Ok(());
            }
            if self.try_table(element, depth, include_comma, name_pad)? {
                return Ok(());
            }
        }
        self.format_expanded(element, depth, include_comma, name_pad)
    }

    fn try_inline(
        &mut self,
        element: &Element,
        depth: usize,
        include_comma: bool,
        name_pad: usize,
    ) -> Result<bool, FormatError> {
        if element.requires_multiple_lines {
            return Ok(false);
        }
        if self.options.max_inline_complexity < 0
            || element.complexity as isize > self.options.max_inline_complexity
        {
            return Ok(false);
        }

        let comma = if include_comma { self.pads.comma_width() } else { 0 };
        if element.minimum_total_width + name_pad + comma > self.available_width(depth) {
            return Ok(false);
        }

        self.line_start(depth);
        self.write_inline_element(element, include_comma, name_pad)?;
        self.out.end_line(self.pads.eol());
        Ok(true)
    }

    /// Arrays of many small elements: bracket lines around rows holding
    /// several elements each, aligned through a shared template when the
    /// rows are similar.
    fn try_compact_array(
        &mut self,
        element: &Element,
        depth: usize,
        include_comma: bool,
        name_pad: usize,
    ) -> Result<bool, FormatError> {
        if element.kind != ElementKind::Array || element.requires_multiple_lines {
            return Ok(false);
        }
        if self.options.max_compact_array_complexity < 0
            || element.complexity as isize > self.options.max_compact_array_complexity
        {
            return Ok(false);
        }
        if element.children.is_empty()
            || element.children.len() < self.options.min_compact_array_row_items
        {
            return Ok(false);
        }

        let mut template =
            ColumnTemplate::new(Rc::clone(&self.pads), self.options.number_list_alignment);
        template.measure_container(element, false);
        let aligned = template.rows_are_alignable();

        let available = self.available_width(depth + 1);
        let comma_width = self.pads.comma_width();
        if element
            .children
            .iter()
            .any(|c| c.minimum_total_width + comma_width > available)
        {
            return Ok(false);
        }
        let slot_width = if aligned {
            match template.kind {
                ColumnKind::Number | ColumnKind::Simple => template.atomic_row_width(),
                _ => template.total_width + self.pads.comma_width(),
            }
        } else {
            let total: usize = element.children.iter().map(|c| c.minimum_total_width).sum();
            total / element.children.len() + self.pads.comma_width()
        };
        if slot_width * self.options.min_compact_array_row_items > available {
            return Ok(false);
        }

        self.line_start(depth);
        self.write_lead_in(element, name_pad);
        self.out.add(self.pads.open(element.kind, BracketMode::Empty));
        self.out.end_line(self.pads.eol());

        let pads = Rc::clone(&self.pads);
        let last = element.children.len() - 1;
        let mut remaining = 0usize;
        let mut row_open = false;
        for (i, child) in element.children.iter().enumerate() {
            let needed = if aligned {
                slot_width
            } else {
                child.minimum_total_width + pads.comma_width()
            };
            if !row_open || remaining < needed {
                if row_open {
                    self.out.end_line(pads.eol());
                }
                self.line_start(depth + 1);
                row_open = true;
                remaining = available;
            }
            if aligned {
                let comma = if i < last { pads.comma() } else { pads.dummy_comma() };
                self.write_row_segment(child, &template, comma)?;
            } else {
                self.write_inline_element(child, i < last, 0)?;
            }
            remaining = remaining.saturating_sub(needed);
        }
        if row_open {
            self.out.end_line(self.pads.eol());
        }

        self.line_start(depth);
        self.out.add(self.pads.close(element.kind, BracketMode::Empty));
        self.write_trailer(element, include_comma);
        self.out.end_line(self.pads.eol());
        Ok(true)
    }

    /// Rows aligned column by column. Applies when the rows are structured
    /// alike and the measured template can be pruned down to the width
    /// budget.
    fn try_table(
        &mut self,
        element: &Element,
        depth: usize,
        include_comma: bool,
        name_pad: usize,
    ) -> Result<bool, FormatError> {
        if self.options.max_table_row_complexity < 0
            || element.complexity as isize > self.options.max_table_row_complexity + 1
        {
            return Ok(false);
        }

        let value_rows = element.children.iter().filter(|c| !c.kind.is_commentish());
        if value_rows.clone().count() < 2 {
            return Ok(false);
        }

        let available = self
            .available_width(depth + 1)
            .saturating_sub(self.pads.comma_width());
        if value_rows.clone().any(|c| c.minimum_total_width > available) {
            return Ok(false);
        }

        let mut template =
            ColumnTemplate::new(Rc::clone(&self.pads), self.options.number_list_alignment);
        template.measure_container(element, true);
        if !template.rows_are_alignable() {
            return Ok(false);
        }
        if !template.try_to_fit(available) {
            return Ok(false);
        }

        self.line_start(depth);
        self.write_lead_in(element, name_pad);
        self.out.add(self.pads.open(element.kind, BracketMode::Empty));
        self.out.end_line(self.pads.eol());

        let pads = Rc::clone(&self.pads);
        let last_value = element
            .children
            .iter()
            .rposition(|c| !c.kind.is_commentish());
        for (i, child) in element.children.iter().enumerate() {
            match child.kind {
                ElementKind::BlankLine => self.write_blank_line(),
                ElementKind::LineComment | ElementKind::BlockComment => {
                    self.write_standalone_comment(child, depth + 1);
                }
                _ => {
                    self.line_start(depth + 1);
                    let comma = if Some(i) == last_value {
                        pads.dummy_comma()
                    } else {
                        pads.comma()
                    };
                    self.write_row_segment(child, &template, comma)?;
                    self.out.end_line(pads.eol());
                }
            }
        }

        self.line_start(depth);
        self.out.add(self.pads.close(element.kind, BracketMode::Empty));
        self.write_trailer(element, include_comma);
        self.out.end_line(self.pads.eol());
        Ok(true)
    }

    fn format_expanded(
        &mut self,
        element: &Element,
        depth: usize,
        include_comma: bool,
        name_pad: usize,
    ) -> Result<(), FormatError> {
        self.line_start(depth);
        self.write_lead_in(element, name_pad);
        self.out.add(self.pads.open(element.kind, BracketMode::Empty));
        self.out.end_line(self.pads.eol());

        let aligned_name_width = self.expanded_name_alignment(element, depth);
        let last_value = element
            .children
            .iter()
            .rposition(|c| !c.kind.is_commentish());
        for (i, child) in element.children.iter().enumerate() {
            let pad = aligned_name_width
                .map(|w| w.saturating_sub(child.name_width))
                .unwrap_or(0);
            let child_comma = last_value.is_some_and(|lv| i < lv);
            self.format_element(child, depth + 1, child_comma, pad)?;
        }

        self.line_start(depth);
        self.out.add(self.pads.close(element.kind, BracketMode::Empty));
        self.write_trailer(element, include_comma);
        self.out.end_line(self.pads.eol());
        Ok(())
    }

    /// Decide whether the members of an expanded object get their names
    /// padded to a common width, and to what width.
    fn expanded_name_alignment(&self, element: &Element, depth: usize) -> Option<usize> {
        if element.kind != ElementKind::Object {
            return None;
        }
        let value_children: Vec<&Element> = element
            .children
            .iter()
            .filter(|c| !c.kind.is_commentish())
            .collect();
        if value_children.len() < 2 {
            return None;
        }

        let mut template =
            ColumnTemplate::new(Rc::clone(&self.pads), self.options.number_list_alignment);
        template.measure_container(element, false);
        if template.any_middle_comment_has_newline || template.name_minimum == usize::MAX {
            return None;
        }
        let spread = template.name_width.saturating_sub(template.name_minimum);
        if spread == 0 || spread > self.options.max_prop_name_padding {
            return None;
        }

        // Padding must not push any still-inlinable member past the budget.
        let available = self.available_width(depth + 1);
        for child in value_children {
            let can_inline = !child.requires_multiple_lines
                && child.complexity as isize <= self.options.max_inline_complexity;
            if can_inline {
                let pad = template.name_width - child.name_width;
                if child.minimum_total_width + pad + self.pads.comma_width() > available {
                    return None;
                }
            }
        }
        Some(template.name_width)
    }

    /// A property whose middle comment spans lines: name on one line, the
    /// comment lines next, then the value formatted one level deeper.
    fn format_with_split_middle_comment(
        &mut self,
        element: &Element,
        depth: usize,
        include_comma: bool,
    ) -> Result<(), FormatError> {
        self.line_start(depth);
        if !element.prefix_comment.is_empty() {
            self.out.add(&element.prefix_comment).add(self.pads.comment());
        }
        self.write_name(element, 0);
        self.out.end_line(self.pads.eol());

        for line in normalize_multiline_comment(&element.middle_comment, element.position.column) {
            self.line_start(depth + 1);
            self.out.add(&line);
            self.out.end_line(self.pads.eol());
        }

        let mut value_only = element.clone();
        value_only.name.clear();
        value_only.prefix_comment.clear();
        value_only.middle_comment.clear();
        value_only.middle_comment_has_newline = false;
        compute_widths(&mut value_only, &self.pads);
        self.format_element(&value_only, depth + 1, include_comma, 0)
    }

    /// Prefix comment, name, and single-line middle comment, as they appear
    /// at the head of any layout.
    fn write_lead_in(&mut self, element: &Element, name_pad: usize) {
        if !element.prefix_comment.is_empty() {
            self.out.add(&element.prefix_comment).add(self.pads.comment());
        }
        self.write_name(element, name_pad);
        if !element.middle_comment.is_empty() {
            self.out.add(&element.middle_comment).add(self.pads.comment());
        }
    }

    fn write_name(&mut self, element: &Element, name_pad: usize) {
        if element.name.is_empty() {
            return;
        }
        if self.options.colon_before_prop_name_padding {
            self.out.add(&element.name).add(self.pads.colon()).spaces(name_pad);
        } else {
            self.out.add(&element.name).spaces(name_pad).add(self.pads.colon());
        }
    }

    /// One element, and everything attached to it, on the current line.
    fn write_inline_element(
        &mut self,
        element: &Element,
        include_comma: bool,
        name_pad: usize,
    ) -> Result<(), FormatError> {
        self.write_lead_in(element, name_pad);
        self.write_inline_value(element)?;
        self.write_trailer(element, include_comma);
        Ok(())
    }

    fn write_inline_value(&mut self, element: &Element) -> Result<(), FormatError> {
        if !element.kind.is_container() {
            self.out.add(&element.value);
            return Ok(());
        }

        let mode = bracket_mode(element);
        self.out.add(self.pads.open(element.kind, mode));
        let last = element.children.len().saturating_sub(1);
        for (i, child) in element.children.iter().enumerate() {
            if child.kind.is_commentish() || child.requires_multiple_lines {
                return Err(FormatError::plain(
                    "Formatter logic error: multiline content in an inline container",
                ));
            }
            self.write_inline_element(child, i < last, 0)?;
        }
        self.out.add(self.pads.close(element.kind, mode));
        Ok(())
    }

    /// Comma and postfix comment after an element. A `//` postfix pulls
    /// the comma in front of itself so the line stays lexically valid.
    fn write_trailer(&mut self, element: &Element, include_comma: bool) {
        let line_style = element.is_post_comment_line_style && !element.postfix_comment.is_empty();
        if line_style {
            if include_comma {
                self.out.add(self.pads.comma());
                if !self.options.comma_padding {
                    self.out.add(self.pads.comment());
                }
            } else {
                self.out.add(self.pads.comment());
            }
            self.out.add(&element.postfix_comment);
        } else {
            if !element.postfix_comment.is_empty() {
                self.out.add(self.pads.comment()).add(&element.postfix_comment);
            }
            if include_comma {
                self.out.add(self.pads.comma());
            }
        }
    }

    /// One table row (or nested cell), every column padded to the widths
    /// the template measured. `comma_text` follows the row: a real comma, a
    /// dummy comma, or nothing.
    fn write_row_segment(
        &mut self,
        row: &Element,
        template: &ColumnTemplate,
        comma_text: &str,
    ) -> Result<(), FormatError> {
        if template.prefix_comment_width > 0 {
            self.out.add(&row.prefix_comment);
            self.out
                .spaces(template.prefix_comment_width - row.prefix_comment_width);
            self.out.add(self.pads.comment());
        }
        if template.name_width > 0 {
            self.write_name(row, template.name_width - row.name_width);
        }
        if template.middle_comment_width > 0 {
            self.out.add(&row.middle_comment);
            self.out
                .spaces(template.middle_comment_width - row.middle_comment_width);
            self.out.add(self.pads.comment());
        }

        let postfix_column = if template.postfix_comment_width == 0 {
            PostfixColumn::Absent
        } else if template.is_any_post_comment_line_style {
            PostfixColumn::CommaThenComment
        } else {
            PostfixColumn::CommentThenComma
        };
        let value_comma = match postfix_column {
            PostfixColumn::CommentThenComma => "",
            _ => comma_text,
        };

        self.write_row_value(row, template, value_comma)?;

        if postfix_column != PostfixColumn::Absent {
            self.out.add(self.pads.comment());
            self.out.add(&row.postfix_comment);
            self.out
                .spaces(template.postfix_comment_width - row.postfix_comment_width);
            if postfix_column == PostfixColumn::CommentThenComma {
                self.out.add(comma_text);
            }
        }
        Ok(())
    }

    fn write_row_value(
        &mut self,
        row: &Element,
        template: &ColumnTemplate,
        comma_text: &str,
    ) -> Result<(), FormatError> {
        let comma_before_padding = match self.options.table_comma_placement {
            TableCommaPlacement::BeforePadding => true,
            TableCommaPlacement::AfterPadding => false,
            TableCommaPlacement::BeforePaddingExceptNumbers => {
                template.kind != ColumnKind::Number
            }
        };

        match template.kind {
            ColumnKind::Number => {
                if comma_before_padding {
                    template.write_number(&mut self.out, row, comma_text);
                } else {
                    template.write_number(&mut self.out, row, "");
                    self.out.add(comma_text);
                }
            }
            ColumnKind::Array | ColumnKind::Object if !template.children.is_empty() => {
                if row.kind == ElementKind::Null {
                    self.out.add(&row.value);
                    self.out
                        .spaces(template.composite_value_width - row.value_width);
                } else {
                    self.out.add(self.pads.open(row.kind, template.pad_mode));
                    self.write_sub_columns(row, template)?;
                    self.out.add(self.pads.close(row.kind, template.pad_mode));
                    self.out.spaces(template.shorter_than_null_adjustment);
                }
                self.out.add(comma_text);
            }
            _ => {
                // Atomic column, or a container column flattened by
                // pruning: the row renders as plain inline text.
                if comma_before_padding {
                    self.write_inline_value(row)?;
                    self.out.add(comma_text);
                    self.out
                        .spaces(template.composite_value_width - row.value_width);
                } else {
                    self.write_inline_value(row)?;
                    self.out
                        .spaces(template.composite_value_width - row.value_width);
                    self.out.add(comma_text);
                }
            }
        }
        Ok(())
    }

    /// The interior of a container row: one slot per sub-column, present
    /// members separated by real commas, absent ones held open with spaces
    /// so the columns stay true across rows.
    fn write_sub_columns(
        &mut self,
        row: &Element,
        template: &ColumnTemplate,
    ) -> Result<(), FormatError> {
        let occupants: Vec<Option<&Element>> = if template.kind == ColumnKind::Array {
            (0..template.children.len())
                .map(|i| row.children.get(i))
                .collect()
        } else {
            template
                .children
                .iter()
                .map(|col| {
                    row.children
                        .iter()
                        .find(|c| Some(c.name.as_str()) == col.location.as_deref())
                })
                .collect()
        };
        let last_present = occupants.iter().rposition(Option::is_some);

        let pads = Rc::clone(&self.pads);
        let column_count = template.children.len();
        for (i, column) in template.children.iter().enumerate() {
            let comma_slot = if i + 1 == column_count {
                ""
            } else if last_present.is_some_and(|lp| i < lp) {
                pads.comma()
            } else {
                pads.dummy_comma()
            };
            match occupants[i] {
                Some(sub) => self.write_row_segment(sub, column, comma_slot)?,
                None => {
                    self.out.spaces(column.total_width);
                    self.out.add(comma_slot);
                }
            }
        }
        Ok(())
    }

    fn write_standalone_comment(&mut self, element: &Element, depth: usize) {
        for line in normalize_multiline_comment(&element.value, element.position.column) {
            self.line_start(depth);
            self.out.add(&line);
            self.out.end_line(self.pads.eol());
        }
    }

    fn write_blank_line(&mut self) {
        self.out.add(&self.options.prefix_string);
        self.out.end_line(self.pads.eol());
    }

    fn line_start(&mut self, depth: usize) {
        self.out.add(&self.options.prefix_string);
        self.out.add(&self.pads.indent(depth));
    }

    fn available_width(&self, depth: usize) -> usize {
        self.options
            .max_total_line_length
            .saturating_sub(self.pads.prefix_width() + self.pads.indent_width(depth))
    }
}

/// Split a multiline comment into output lines. Continuation lines lose
/// leading whitespace up to the first line's original column, which keeps
/// deliberately indented comment art intact while removing the indent it
/// had in the source.
fn normalize_multiline_comment(text: &str, first_line_column: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for (i, raw) in text.split('\n').enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if i == 0 {
            lines.push(raw.to_string());
            continue;
        }
        if raw.trim().is_empty() {
            continue;
        }
        let mut stripped = 0usize;
        for ch in raw.chars() {
            if stripped >= first_line_column || !ch.is_whitespace() {
                break;
            }
            stripped += 1;
        }
        let start: usize = raw
            .char_indices()
            .nth(stripped)
            .map(|(idx, _)| idx)
            .unwrap_or(raw.len());
        lines.push(raw[start..].to_string());
    }
    lines.retain(|l| !l.trim().is_empty());
    lines
}

fn minify_value(out: &mut LineWriter, element: &Element, include_comma: bool, eol: &str) {
    if !element.prefix_comment.is_empty() {
        out.add(&element.prefix_comment);
    }
    if !element.name.is_empty() {
        out.add(&element.name).add(":");
    }
    if !element.middle_comment.is_empty() {
        for segment in element.middle_comment.split('\n') {
            if segment.is_empty() {
                continue;
            }
            out.add(segment);
            if segment.starts_with("//") {
                out.end_line(eol);
            }
        }
    }

    match element.kind {
        ElementKind::Array | ElementKind::Object => {
            let open = if element.kind == ElementKind::Array { "[" } else { "{" };
            let close = if element.kind == ElementKind::Array { "]" } else { "}" };
            out.add(open);
            let last_value = element
                .children
                .iter()
                .rposition(|c| !c.kind.is_commentish());
            for (i, child) in element.children.iter().enumerate() {
                match child.kind {
                    ElementKind::BlankLine => {
                        if out.line_in_progress() {
                            out.end_line(eol);
                        }
                        out.end_line(eol);
                    }
                    ElementKind::LineComment => {
                        out.add(&child.value).end_line(eol);
                    }
                    ElementKind::BlockComment => {
                        out.add(&child.value);
                    }
                    _ => {
                        let comma = last_value.is_some_and(|lv| i < lv);
                        minify_value(out, child, comma, eol);
                    }
                }
            }
            out.add(close);
        }
        _ => {
            out.add(&element.value);
        }
    }

    if element.is_post_comment_line_style && !element.postfix_comment.is_empty() {
        if include_comma {
            out.add(",");
        }
        out.add(&element.postfix_comment).end_line(eol);
    } else {
        if !element.postfix_comment.is_empty() {
            out.add(&element.postfix_comment);
        }
        if include_comma {
            out.add(",");
        }
    }
}
