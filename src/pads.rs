use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::{BracketMode, ElementKind};
use crate::options::{EolStyle, FormatOptions};

/// Measures the rendered width of a string. The default counts code points;
/// callers embedding the output in, say, an East-Asian terminal can supply
/// their own. Every width the formatter computes goes through the same hook
/// so column arithmetic stays consistent.
pub type WidthFn = Rc<dyn Fn(&str) -> usize>;

pub fn default_width_fn() -> WidthFn {
    Rc::new(|s: &str| s.chars().count())
}

/// Punctuation strings and widths, precomputed once per format invocation.
///
/// Bracket pairs come in three variants keyed by [`BracketMode`], reflecting
/// the simple/nested bracket padding options. The indent cache grows lazily;
/// level `k` is level `k-1` plus one unit.
#[derive(Clone)]
pub struct Pads {
    measure: WidthFn,

    comma: String,
    colon: String,
    comment: String,
    eol: String,
    dummy_comma: String,

    comma_width: usize,
    colon_width: usize,
    comment_width: usize,
    null_width: usize,
    true_width: usize,
    false_width: usize,
    prefix_width: usize,

    array_open: [String; 3],
    array_close: [String; 3],
    object_open: [String; 3],
    object_close: [String; 3],
    array_open_width: [usize; 3],
    array_close_width: [usize; 3],
    object_open_width: [usize; 3],
    object_close_width: [usize; 3],

    indent_unit: String,
    indent_cache: RefCell<Vec<(String, usize)>>,
}

impl Pads {
    pub fn new(options: &FormatOptions, measure: WidthFn) -> Self {
        let simple_pad = options.simple_bracket_padding;
        let nested_pad = options.nested_bracket_padding;

        let bracket_set = |bare: &str, open: bool| -> [String; 3] {
            let padded = |with_pad: bool| {
                if !with_pad {
                    bare.to_string()
                } else if open {
                    format!("{bare} ")
                } else {
                    format!(" {bare}")
                }
            };
            [bare.to_string(), padded(simple_pad), padded(nested_pad)]
        };

        let array_open = bracket_set("[", true);
        let array_close = bracket_set("]", false);
        let object_open = bracket_set("{", true);
        let object_close = bracket_set("}", false);

        let comma = if options.comma_padding { ", " } else { "," }.to_string();
        let colon = if options.colon_padding { ": " } else { ":" }.to_string();
        let comment = if options.comment_padding { " " } else { "" }.to_string();
        let eol = match options.json_eol_style {
            EolStyle::Crlf => "\r\n",
            EolStyle::Lf => "\n",
        }
        .to_string();

        let widths_of = |set: &[String; 3]| -> [usize; 3] {
            [measure(&set[0]), measure(&set[1]), measure(&set[2])]
        };
        let array_open_width = widths_of(&array_open);
        let array_close_width = widths_of(&array_close);
        let object_open_width = widths_of(&object_open);
        let object_close_width = widths_of(&object_close);

        let comma_width = measure(&comma);
        let indent_unit = if options.use_tab_to_indent {
            "\t".to_string()
        } else {
            " ".repeat(options.indent_spaces)
        };

        Self {
            comma_width,
            colon_width: measure(&colon),
            comment_width: measure(&comment),
            null_width: measure("null"),
            true_width: measure("true"),
            false_width: measure("false"),
            prefix_width: measure(&options.prefix_string),
            dummy_comma: " ".repeat(comma_width),
            comma,
            colon,
            comment,
            eol,
            array_open,
            array_close,
            object_open,
            object_close,
            array_open_width,
            array_close_width,
            object_open_width,
            object_close_width,
            indent_unit,
            indent_cache: RefCell::new(vec![(String::new(), 0)]),
            measure,
        }
    }

    pub fn width_of(&self, text: &str) -> usize {
        (self.measure)(text)
    }

    pub fn comma(&self) -> &str {
        &self.comma
    }
    pub fn colon(&self) -> &str {
        &self.colon
    }
    pub fn comment(&self) -> &str {
        &self.comment
    }
    pub fn eol(&self) -> &str {
        &self.eol
    }
    /// Spaces as wide as a comma, for keeping columns aligned on rows where
    /// no comma belongs.
    pub fn dummy_comma(&self) -> &str {
        &self.dummy_comma
    }

    pub fn comma_width(&self) -> usize {
        self.comma_width
    }
    pub fn colon_width(&self) -> usize {
        self.colon_width
    }
    pub fn comment_width(&self) -> usize {
        self.comment_width
    }
    pub fn null_width(&self) -> usize {
        self.null_width
    }
    pub fn true_width(&self) -> usize {
        self.true_width
    }
    pub fn false_width(&self) -> usize {
        self.false_width
    }
    pub fn prefix_width(&self) -> usize {
        self.prefix_width
    }

    pub fn open(&self, kind: ElementKind, mode: BracketMode) -> &str {
        if kind == ElementKind::Array {
            &self.array_open[mode as usize]
        } else {
            &self.object_open[mode as usize]
        }
    }

    pub fn close(&self, kind: ElementKind, mode: BracketMode) -> &str {
        if kind == ElementKind::Array {
            &self.array_close[mode as usize]
        } else {
            &self.object_close[mode as usize]
        }
    }

    pub fn open_width(&self, kind: ElementKind, mode: BracketMode) -> usize {
        if kind == ElementKind::Array {
            self.array_open_width[mode as usize]
        } else {
            self.object_open_width[mode as usize]
        }
    }

    pub fn close_width(&self, kind: ElementKind, mode: BracketMode) -> usize {
        if kind == ElementKind::Array {
            self.array_close_width[mode as usize]
        } else {
            self.object_close_width[mode as usize]
        }
    }

    pub fn indent(&self, level: usize) -> String {
        self.grow_indent_cache(level);
        self.indent_cache.borrow()[level].0.clone()
    }

    pub fn indent_width(&self, level: usize) -> usize {
        self.grow_indent_cache(level);
        self.indent_cache.borrow()[level].1
    }

    fn grow_indent_cache(&self, level: usize) {
        let mut cache = self.indent_cache.borrow_mut();
        while cache.len() <= level {
            let prev = &cache[cache.len() - 1].0;
            let next = format!("{prev}{}", self.indent_unit);
            let width = (self.measure)(&next);
            cache.push((next, width));
        }
    }
}
