use std::collections::HashSet;
use std::rc::Rc;

use crate::dom::{BracketMode, ColumnKind, Element, ElementKind};
use crate::options::NumberListAlignment;
use crate::pads::Pads;
use crate::writer::LineWriter;

/// Per-column measurements over the rows of a container, used to lay the
/// container out as a table (or to align names in an expanded object).
///
/// The root template describes the container's rows as a whole; `children`
/// describe the rows' own columns — positional for array rows, keyed by
/// property name for object rows. Templates are derived from elements at
/// emission time and never feed back into them.
#[derive(Clone)]
pub struct ColumnTemplate {
    /// Property name this column binds to within object rows; None for a
    /// positional (array) column and for the root.
    pub location: Option<String>,
    pub kind: ColumnKind,
    pub rows: usize,

    pub name_width: usize,
    pub name_minimum: usize,
    pub max_value_width: usize,
    pub max_atomic_value_width: usize,
    pub prefix_comment_width: usize,
    pub middle_comment_width: usize,
    pub postfix_comment_width: usize,

    pub any_middle_comment_has_newline: bool,
    pub is_any_post_comment_line_style: bool,
    pub requires_multiple_lines: bool,
    pub contains_null: bool,

    pub pad_mode: BracketMode,
    /// Width of the value region once sub-columns and alignment are
    /// resolved.
    pub composite_value_width: usize,
    /// Width of the whole segment: comments, name, value.
    pub total_width: usize,
    /// Extra padding non-null rows need when the composite value region
    /// came out narrower than the literal `null`.
    pub shorter_than_null_adjustment: usize,

    pub children: Vec<ColumnTemplate>,

    pads: Rc<Pads>,
    alignment: NumberListAlignment,
    max_digits_before_decimal: usize,
    max_digits_after_decimal: usize,
}

impl ColumnTemplate {
    pub fn new(pads: Rc<Pads>, alignment: NumberListAlignment) -> Self {
        Self {
            location: None,
            kind: ColumnKind::Unknown,
            rows: 0,
            name_width: 0,
            name_minimum: usize::MAX,
            max_value_width: 0,
            max_atomic_value_width: 0,
            prefix_comment_width: 0,
            middle_comment_width: 0,
            postfix_comment_width: 0,
            any_middle_comment_has_newline: false,
            is_any_post_comment_line_style: false,
            requires_multiple_lines: false,
            contains_null: false,
            pad_mode: BracketMode::Simple,
            composite_value_width: 0,
            total_width: 0,
            shorter_than_null_adjustment: 0,
            children: Vec::new(),
            pads,
            alignment,
            max_digits_before_decimal: 0,
            max_digits_after_decimal: 0,
        }
    }

    /// Measure every row of `container`. With `recursive`, sub-columns are
    /// measured too; without it the analysis stops at the rows themselves,
    /// which is all the compact-multiline layout needs.
    pub fn measure_container(&mut self, container: &Element, recursive: bool) {
        for row in &container.children {
            self.measure_row(row, recursive);
        }
        self.prune_and_recompute(usize::MAX);
    }

    /// Repeatedly flatten the deepest sub-columns until the template fits
    /// `max_width`. Fails only when even the fully flattened template is
    /// too wide.
    pub fn try_to_fit(&mut self, max_width: usize) -> bool {
        let mut allowed = self.depth();
        loop {
            if self.total_width <= max_width {
                return true;
            }
            if allowed == 0 {
                return false;
            }
            allowed -= 1;
            self.prune_and_recompute(allowed);
        }
    }

    /// True when the rows were similar enough for column-aligned layout.
    pub fn rows_are_alignable(&self) -> bool {
        !matches!(self.kind, ColumnKind::Mixed | ColumnKind::Unknown)
            && !self.requires_multiple_lines
    }

    /// Estimated width of one aligned slot holding an atomic value, for
    /// feasibility checks before committing to a layout.
    pub fn atomic_row_width(&self) -> usize {
        let mut width = self.name_width;
        if self.name_width > 0 {
            width += self.pads.colon_width();
        }
        if self.middle_comment_width > 0 {
            width += self.middle_comment_width + self.pads.comment_width();
        }
        width += self.max_atomic_value_width;
        if self.postfix_comment_width > 0 {
            width += self.postfix_comment_width + self.pads.comment_width();
        }
        width + self.pads.comma_width()
    }

    fn measure_row(&mut self, row: &Element, recursive: bool) {
        if row.kind.is_commentish() {
            return;
        }

        let row_kind = match row.kind {
            ElementKind::Null => ColumnKind::Unknown,
            ElementKind::Number => ColumnKind::Number,
            ElementKind::Array => ColumnKind::Array,
            ElementKind::Object => ColumnKind::Object,
            _ => ColumnKind::Simple,
        };

        if self.kind == ColumnKind::Unknown {
            self.kind = row_kind;
        } else if row_kind != ColumnKind::Unknown && self.kind != row_kind {
            self.kind = ColumnKind::Mixed;
        }

        if row.kind == ElementKind::Null {
            // Count null's width toward the integer part so a null row
            // doesn't break decimal alignment.
            self.max_digits_before_decimal =
                self.max_digits_before_decimal.max(self.pads.null_width());
            self.contains_null = true;
        }

        if row.requires_multiple_lines {
            self.requires_multiple_lines = true;
            self.kind = ColumnKind::Mixed;
        }

        self.rows += 1;
        self.name_width = self.name_width.max(row.name_width);
        self.name_minimum = self.name_minimum.min(row.name_width);
        self.max_value_width = self.max_value_width.max(row.value_width);
        self.prefix_comment_width = self.prefix_comment_width.max(row.prefix_comment_width);
        self.middle_comment_width = self.middle_comment_width.max(row.middle_comment_width);
        self.postfix_comment_width = self.postfix_comment_width.max(row.postfix_comment_width);
        self.is_any_post_comment_line_style |= row.is_post_comment_line_style;
        self.any_middle_comment_has_newline |= row.middle_comment_has_newline;

        if !row.kind.is_container() {
            self.max_atomic_value_width = self.max_atomic_value_width.max(row.value_width);
        }

        if row.complexity >= 2 {
            self.pad_mode = BracketMode::Complex;
        }

        if self.requires_multiple_lines || row.kind == ElementKind::Null {
            return;
        }

        if recursive && self.kind == ColumnKind::Array {
            for (i, sub) in row.children.iter().enumerate() {
                if self.children.len() <= i {
                    self.children
                        .push(ColumnTemplate::new(Rc::clone(&self.pads), self.alignment));
                }
                self.children[i].measure_row(sub, true);
            }
        } else if recursive && self.kind == ColumnKind::Object {
            if has_duplicate_names(&row.children) {
                // Ambiguous columns; treat the rows as opaque text.
                self.kind = ColumnKind::Simple;
                return;
            }
            for sub in &row.children {
                let found = self
                    .children
                    .iter()
                    .position(|c| c.location.as_deref() == Some(sub.name.as_str()));
                match found {
                    Some(idx) => self.children[idx].measure_row(sub, true),
                    None => {
                        let mut column =
                            ColumnTemplate::new(Rc::clone(&self.pads), self.alignment);
                        column.location = Some(sub.name.clone());
                        column.measure_row(sub, true);
                        self.children.push(column);
                    }
                }
            }
        }

        if self.kind == ColumnKind::Number
            && !matches!(
                self.alignment,
                NumberListAlignment::Left | NumberListAlignment::Right
            )
        {
            self.measure_number_digits(row);
        }
    }

    fn measure_number_digits(&mut self, row: &Element) {
        let mut text = row.value.clone();
        if self.alignment == NumberListAlignment::Normalize {
            let parsed: f64 = text.parse().unwrap_or(f64::NAN);
            text = parsed.to_string();

            let representable = parsed.is_finite()
                && text.len() <= 16
                && !text.contains('e')
                && (parsed != 0.0 || is_literal_zero(&row.value));
            if !representable {
                self.alignment = NumberListAlignment::Left;
                return;
            }
        }

        match decimal_anchor_index(&text) {
            Some(idx) => {
                self.max_digits_before_decimal = self.max_digits_before_decimal.max(idx);
                self.max_digits_after_decimal = self
                    .max_digits_after_decimal
                    .max(text.len().saturating_sub(idx + 1));
            }
            None => {
                self.max_digits_before_decimal = self.max_digits_before_decimal.max(text.len());
            }
        }
    }

    fn prune_and_recompute(&mut self, allowed_depth: usize) {
        let flatten = allowed_depth == 0
            || !matches!(self.kind, ColumnKind::Array | ColumnKind::Object)
            || self.rows < 2;
        if flatten {
            self.children.clear();
        }

        for child in &mut self.children {
            child.prune_and_recompute(allowed_depth.saturating_sub(1));
        }

        if self.kind == ColumnKind::Number {
            self.composite_value_width = self.number_field_width();
        } else if !self.children.is_empty() {
            let element_kind = if self.kind == ColumnKind::Object {
                ElementKind::Object
            } else {
                ElementKind::Array
            };
            let inner: usize = self.children.iter().map(|c| c.total_width).sum();
            self.composite_value_width = inner
                + self
                    .pads
                    .comma_width()
                    .saturating_mul(self.children.len().saturating_sub(1))
                + self.pads.open_width(element_kind, self.pad_mode)
                + self.pads.close_width(element_kind, self.pad_mode);
            if self.contains_null && self.composite_value_width < self.pads.null_width() {
                self.shorter_than_null_adjustment =
                    self.pads.null_width() - self.composite_value_width;
                self.composite_value_width = self.pads.null_width();
            }
        } else {
            self.composite_value_width = self.max_value_width;
        }

        let comment = |width: usize| {
            if width > 0 {
                width + self.pads.comment_width()
            } else {
                0
            }
        };
        self.total_width = comment(self.prefix_comment_width)
            + if self.name_width > 0 {
                self.name_width + self.pads.colon_width()
            } else {
                0
            }
            + comment(self.middle_comment_width)
            + self.composite_value_width
            + comment(self.postfix_comment_width);
    }

    fn depth(&self) -> usize {
        match self.children.iter().map(ColumnTemplate::depth).max() {
            Some(deepest) => deepest + 1,
            None => 0,
        }
    }

    fn number_field_width(&self) -> usize {
        match self.alignment {
            NumberListAlignment::Decimal | NumberListAlignment::Normalize => {
                let point = usize::from(self.max_digits_after_decimal > 0);
                self.max_digits_before_decimal + point + self.max_digits_after_decimal
            }
            _ => self.max_value_width,
        }
    }

    /// Write one number (or null) row of a number column, padded to the
    /// column's composite width. `comma_before_pad` is whatever should sit
    /// between the value and its right padding: a comma, a dummy comma, or
    /// nothing when the comma is placed after the padding instead.
    pub fn write_number(&self, out: &mut LineWriter, row: &Element, comma_before_pad: &str) {
        match self.alignment {
            NumberListAlignment::Left => {
                out.add(&row.value)
                    .add(comma_before_pad)
                    .spaces(self.max_value_width - row.value_width);
                return;
            }
            NumberListAlignment::Right => {
                out.spaces(self.max_value_width - row.value_width)
                    .add(&row.value)
                    .add(comma_before_pad);
                return;
            }
            NumberListAlignment::Decimal | NumberListAlignment::Normalize => {}
        }

        if row.kind == ElementKind::Null {
            out.spaces(self.max_digits_before_decimal.saturating_sub(row.value_width))
                .add(&row.value)
                .add(comma_before_pad)
                .spaces(self.composite_value_width - self.max_digits_before_decimal);
            return;
        }

        if self.alignment == NumberListAlignment::Normalize {
            let parsed: f64 = row.value.parse().unwrap_or(f64::NAN);
            let rewritten = format!("{:.*}", self.max_digits_after_decimal, parsed);
            let width = self.pads.width_of(&rewritten);
            out.spaces(self.composite_value_width.saturating_sub(width))
                .add(&rewritten)
                .add(comma_before_pad);
            return;
        }

        let (left_pad, right_pad) = match decimal_anchor_index(&row.value) {
            Some(idx) => {
                let left = self.max_digits_before_decimal.saturating_sub(idx);
                let right = self
                    .composite_value_width
                    .saturating_sub(left + row.value_width);
                (left, right)
            }
            None => {
                let left = self.max_digits_before_decimal.saturating_sub(row.value_width);
                let right = self
                    .composite_value_width
                    .saturating_sub(self.max_digits_before_decimal);
                (left, right)
            }
        };
        out.spaces(left_pad)
            .add(&row.value)
            .add(comma_before_pad)
            .spaces(right_pad);
    }
}

/// Index of the first `.`, `e`, or `E`, which is where decimal alignment
/// anchors.
fn decimal_anchor_index(value: &str) -> Option<usize> {
    value.find(['.', 'e', 'E'])
}

/// True when the text denotes exactly zero, so Normalize can tell a real
/// zero from an underflowed parse.
fn is_literal_zero(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let mut saw_digit = false;
    for ch in digits.chars() {
        match ch {
            'e' | 'E' => return saw_digit,
            '0' | '.' => saw_digit = true,
            _ => return false,
        }
    }
    saw_digit
}

fn has_duplicate_names(rows: &[Element]) -> bool {
    let mut seen = HashSet::new();
    rows.iter().any(|row| !seen.insert(row.name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::compute_widths;
    use crate::options::{CommentPolicy, FormatOptions};
    use crate::pads::default_width_fn;
    use crate::parse::Parser;

    fn measured(text: &str, alignment: NumberListAlignment) -> (ColumnTemplate, Element) {
        let mut options = FormatOptions::default();
        options.comment_policy = CommentPolicy::Preserve;
        options.number_list_alignment = alignment;
        let pads = Rc::new(Pads::new(&options, default_width_fn()));
        let mut doc = Parser::new(options).parse_document(text, true).unwrap();
        let mut root = doc.remove(0);
        compute_widths(&mut root, &pads);

        let mut template = ColumnTemplate::new(Rc::clone(&pads), alignment);
        template.measure_container(&root, true);
        (template, root)
    }

    #[test]
    fn uniform_objects_infer_columns_by_name() {
        let (template, _) =
            measured(r#"[{"a":1,"b":"x"},{"a":22,"b":"yy"}]"#, NumberListAlignment::Decimal);
        assert_eq!(template.kind, ColumnKind::Object);
        assert_eq!(template.children.len(), 2);
        assert_eq!(template.children[0].location.as_deref(), Some("\"a\""));
        assert_eq!(template.children[0].kind, ColumnKind::Number);
        assert_eq!(template.children[1].kind, ColumnKind::Simple);
    }

    #[test]
    fn mixed_rows_bar_alignment() {
        let (template, _) = measured(r#"[1, "two"]"#, NumberListAlignment::Decimal);
        assert_eq!(template.kind, ColumnKind::Mixed);
        assert!(!template.rows_are_alignable());
    }

    #[test]
    fn null_is_universal_for_type_inference() {
        let (template, _) = measured("[1, null, 2.5]", NumberListAlignment::Decimal);
        assert_eq!(template.kind, ColumnKind::Number);
        assert!(template.contains_null);
    }

    #[test]
    fn duplicate_keys_disable_column_inference() {
        let (template, _) =
            measured(r#"[{"k":1,"k":2},{"k":3,"k":4}]"#, NumberListAlignment::Decimal);
        assert!(!template.rows_are_alignable());
        assert!(template.children.is_empty());
    }

    #[test]
    fn decimal_alignment_measures_digit_spans() {
        let (template, _) = measured("[1.5, 22.25, 3]", NumberListAlignment::Decimal);
        // widest whole part "22", widest fraction "25", plus the point
        assert_eq!(template.composite_value_width, 2 + 1 + 2);
    }

    #[test]
    fn normalize_degrades_to_left_on_exponent() {
        let (template, root) = measured("[1.5, 2e300]", NumberListAlignment::Normalize);
        let mut out = LineWriter::new();
        template.write_number(&mut out, &root.children[0], "");
        let text = out.into_string();
        assert!(text.starts_with("1.5"));
    }

    #[test]
    fn single_row_template_flattens_children() {
        let (template, _) = measured(r#"[{"a":1}]"#, NumberListAlignment::Decimal);
        assert!(template.children.is_empty());
    }

    #[test]
    fn try_to_fit_prunes_until_it_fits() {
        let (mut template, _) = measured(
            r#"[{"p":{"x":1,"y":2},"q":1},{"p":{"x":3,"y":4},"q":2}]"#,
            NumberListAlignment::Decimal,
        );
        let wide = template.total_width;
        assert!(template.try_to_fit(wide));
        assert!(template.try_to_fit(wide / 2) || template.children.is_empty());
    }

    #[test]
    fn write_number_aligns_on_the_decimal_point() {
        let (template, root) = measured("[1.5, 22.25, 3]", NumberListAlignment::Decimal);
        let render = |row: &Element| {
            let mut out = LineWriter::new();
            template.write_number(&mut out, row, "");
            out.add("|").end_line("\n");
            out.into_string()
        };
        assert_eq!(render(&root.children[0]), " 1.5 |\n");
        assert_eq!(render(&root.children[1]), "22.25|\n");
        assert_eq!(render(&root.children[2]), " 3   |\n");
    }
}
