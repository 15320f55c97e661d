use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use is_terminal::IsTerminal;
use neatjson::{CommentPolicy, EolStyle, Formatter, FormatOptions, NumberListAlignment};

/// A human-friendly JSON/JSONC formatter.
///
/// Reads JSON from files or stdin and rewrites it with smart line breaks:
/// short containers inline, long arrays wrap several items per line, and
/// similar rows align into tables.
#[derive(Parser, Debug)]
#[command(name = "neatjson")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file(s). Reads stdin when omitted.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Write output to a file instead of stdout.
    #[arg(short, long, value_name = "FILE", conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Rewrite each input file in place.
    #[arg(short = 'i', long)]
    in_place: bool,

    /// Minify instead of formatting.
    #[arg(short, long)]
    compact: bool,

    /// Maximum line width before breaking.
    #[arg(short = 'w', long, default_value = "120")]
    max_width: usize,

    /// Spaces per indentation level.
    #[arg(long, default_value = "4")]
    indent: usize,

    /// Indent with tabs.
    #[arg(short = 't', long)]
    tabs: bool,

    /// Line ending style.
    #[arg(long, value_enum, default_value = "lf")]
    eol: EolArg,

    /// How to handle comments in the input.
    #[arg(long, value_enum, default_value = "error")]
    comments: CommentsArg,

    /// Accept trailing commas in the input.
    #[arg(long)]
    trailing_commas: bool,

    /// Keep blank lines from the input.
    #[arg(long)]
    preserve_blanks: bool,

    /// Number alignment within aligned columns.
    #[arg(long, value_enum, default_value = "decimal")]
    number_align: NumberAlignArg,

    /// Maximum nesting depth for single-line containers (-1 disables).
    #[arg(long, default_value = "2")]
    max_inline_complexity: isize,

    /// Maximum nesting depth for table rows (-1 disables).
    #[arg(long, default_value = "2")]
    max_table_complexity: isize,

    /// No spaces inside brackets of all-scalar containers.
    #[arg(long)]
    no_simple_bracket_padding: bool,

    /// No spaces inside brackets of nested containers.
    #[arg(long)]
    no_nested_bracket_padding: bool,

    /// Treat input as JSON Lines, one value per line.
    #[arg(long)]
    jsonl: bool,

    /// What to do with lines that fail to parse (with --jsonl).
    #[arg(long, value_enum, default_value = "fail")]
    jsonl_errors: JsonlErrorsArg,

    /// Colorize terminal output.
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EolArg {
    Lf,
    Crlf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CommentsArg {
    Error,
    Remove,
    Preserve,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NumberAlignArg {
    Left,
    Right,
    Decimal,
    Normalize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum JsonlErrorsArg {
    /// Stop at the first bad line.
    Fail,
    /// Drop bad lines.
    Skip,
    /// Copy bad lines through unchanged.
    Passthrough,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorArg {
    Auto,
    Always,
    Never,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("neatjson: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut formatter = Formatter::new();
    apply_options(&mut formatter.options, &args);

    if args.in_place {
        if args.files.is_empty() {
            return Err("--in-place requires file arguments".into());
        }
        for path in &args.files {
            let input = fs::read_to_string(path)
                .map_err(|e| format!("cannot read '{}': {e}", path.display()))?;
            let output = format_text(&input, &mut formatter, &args)
                .map_err(|e| format!("{}: {e}", path.display()))?;
            fs::write(path, &output)
                .map_err(|e| format!("cannot write '{}': {e}", path.display()))?;
        }
        return Ok(());
    }

    let input = if args.files.is_empty() {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        let mut combined = String::new();
        for path in &args.files {
            combined.push_str(
                &fs::read_to_string(path)
                    .map_err(|e| format!("cannot read '{}': {e}", path.display()))?,
            );
        }
        combined
    };

    let output = format_text(&input, &mut formatter, &args)?;
    let output = if args.output.is_none() && should_colorize(args.color) {
        highlight(&output)
    } else {
        output
    };

    match args.output {
        Some(path) => fs::write(&path, &output)
            .map_err(|e| format!("cannot write '{}': {e}", path.display()))?,
        None => io::stdout().write_all(output.as_bytes())?,
    }
    Ok(())
}

fn format_text(
    input: &str,
    formatter: &mut Formatter,
    args: &Args,
) -> Result<String, Box<dyn std::error::Error>> {
    if args.jsonl {
        return format_jsonl(input, formatter, args.compact, args.jsonl_errors);
    }
    let output = if args.compact {
        formatter.minify(input)?
    } else {
        formatter.reformat(input, 0)?
    };
    Ok(output)
}

fn format_jsonl(
    input: &str,
    formatter: &mut Formatter,
    compact: bool,
    errors: JsonlErrorsArg,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut lines = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let result = if compact {
            formatter.minify(line)
        } else {
            formatter.reformat(line, 0)
        };
        match result {
            Ok(formatted) => lines.push(formatted.trim_end().to_string()),
            Err(e) => match errors {
                JsonlErrorsArg::Fail => return Err(format!("line {}: {e}", line_no + 1).into()),
                JsonlErrorsArg::Skip => continue,
                JsonlErrorsArg::Passthrough => lines.push(line.to_string()),
            },
        }
    }
    let mut output = lines.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    Ok(output)
}

fn apply_options(options: &mut FormatOptions, args: &Args) {
    options.max_total_line_length = args.max_width;
    options.indent_spaces = args.indent;
    options.use_tab_to_indent = args.tabs;
    options.json_eol_style = match args.eol {
        EolArg::Lf => EolStyle::Lf,
        EolArg::Crlf => EolStyle::Crlf,
    };
    options.comment_policy = match args.comments {
        CommentsArg::Error => CommentPolicy::TreatAsError,
        CommentsArg::Remove => CommentPolicy::Remove,
        CommentsArg::Preserve => CommentPolicy::Preserve,
    };
    options.number_list_alignment = match args.number_align {
        NumberAlignArg::Left => NumberListAlignment::Left,
        NumberAlignArg::Right => NumberListAlignment::Right,
        NumberAlignArg::Decimal => NumberListAlignment::Decimal,
        NumberAlignArg::Normalize => NumberListAlignment::Normalize,
    };
    options.allow_trailing_commas = args.trailing_commas;
    options.preserve_blank_lines = args.preserve_blanks;
    options.max_inline_complexity = args.max_inline_complexity;
    options.max_table_row_complexity = args.max_table_complexity;
    options.simple_bracket_padding = !args.no_simple_bracket_padding;
    options.nested_bracket_padding = !args.no_nested_bracket_padding;
}

fn should_colorize(mode: ColorArg) -> bool {
    match mode {
        ColorArg::Auto => io::stdout().is_terminal(),
        ColorArg::Always => true,
        ColorArg::Never => false,
    }
}

const RESET: &str = "\x1b[0m";
const KEY: &str = "\x1b[94m";
const STRING: &str = "\x1b[32m";
const NUMBER: &str = "\x1b[36m";
const LITERAL: &str = "\x1b[35m";
const COMMENT: &str = "\x1b[90m";

/// ANSI-colorize already-formatted output. Strings that are followed by a
/// colon are keys; everything else is recognized by its first character.
/// Punctuation and whitespace pass through unstyled.
fn highlight(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        let taken = match ch {
            '"' => {
                let len = string_token_len(rest);
                let color = if rest[len..].trim_start().starts_with(':') { KEY } else { STRING };
                paint(&mut out, color, &rest[..len]);
                len
            }
            '/' if rest.starts_with("//") => {
                let len = rest.find('\n').unwrap_or(rest.len());
                paint(&mut out, COMMENT, &rest[..len]);
                len
            }
            '/' if rest.starts_with("/*") => {
                let len = rest.find("*/").map(|i| i + 2).unwrap_or(rest.len());
                paint(&mut out, COMMENT, &rest[..len]);
                len
            }
            '-' | '0'..='9' => {
                let len = rest
                    .find(|c: char| !c.is_ascii_digit() && !matches!(c, '-' | '+' | '.' | 'e' | 'E'))
                    .unwrap_or(rest.len());
                paint(&mut out, NUMBER, &rest[..len]);
                len
            }
            't' if rest.starts_with("true") => {
                paint(&mut out, LITERAL, "true");
                4
            }
            'f' if rest.starts_with("false") => {
                paint(&mut out, LITERAL, "false");
                5
            }
            'n' if rest.starts_with("null") => {
                paint(&mut out, LITERAL, "null");
                4
            }
            _ => {
                out.push(ch);
                ch.len_utf8()
            }
        };
        rest = &rest[taken..];
    }
    out
}

/// Byte length of the string token at the start of `text`, including both
/// quotes, respecting backslash escapes.
fn string_token_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn paint(out: &mut String, color: &str, token: &str) {
    out.push_str(color);
    out.push_str(token);
    out.push_str(RESET);
}
