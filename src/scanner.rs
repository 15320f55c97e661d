use crate::dom::{TextPosition, Token, TokenKind};
use crate::error::FormatError;

/// Inputs longer than this would threaten the position arithmetic.
const MAX_INPUT_BYTES: usize = 2_000_000_000;

/// Lazy token producer over the raw input text.
///
/// The scanner walks bytes, not chars. Every syntactic character of JSON is
/// ASCII, so multibyte UTF-8 sequences only ever appear inside strings and
/// comments, where they pass through untouched. The control-character check
/// covers 0x00-0x1F and 0x7F only; continuation bytes 0x80-0xBF are legal
/// string content.
///
/// Horizontal whitespace is consumed silently. A newline on a line that held
/// no other ink yields a synthetic `BlankLine` token so the parser can keep
/// the document's vertical rhythm.
pub struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: TextPosition,
    token_start: TextPosition,
    ink_on_line: bool,
    size_checked: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: TextPosition::default(),
            token_start: TextPosition::default(),
            ink_on_line: false,
            size_checked: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos.index).copied()
    }

    fn at_end(&self) -> bool {
        self.pos.index >= self.bytes.len()
    }

    /// Consume one byte of token content.
    fn bump(&mut self) {
        self.pos.index += 1;
        self.pos.column += 1;
        self.ink_on_line = true;
    }

    /// Consume one byte of horizontal whitespace.
    fn bump_quiet(&mut self) {
        self.pos.index += 1;
        self.pos.column += 1;
    }

    /// Consume a newline byte.
    fn bump_newline(&mut self) {
        self.pos.index += 1;
        self.pos.row += 1;
        self.pos.column = 0;
        self.ink_on_line = false;
    }

    fn mark_token_start(&mut self) {
        self.token_start = self.pos;
    }

    fn token_here(&self, kind: TokenKind, text: &str) -> Token {
        Token { kind, text: text.to_string(), position: self.token_start }
    }

    fn token_from_span(&self, kind: TokenKind, trim_end: bool) -> Token {
        let mut text = &self.text[self.token_start.index..self.pos.index];
        if trim_end {
            text = text.trim_end();
        }
        Token { kind, text: text.to_string(), position: self.token_start }
    }

    fn fail(&self, message: &str) -> FormatError {
        FormatError::at(message, self.pos)
    }

    fn scan_punctuation(&mut self, symbol: &str, kind: TokenKind) -> Result<Token, FormatError> {
        self.mark_token_start();
        let token = self.token_here(kind, symbol);
        self.bump();
        Ok(token)
    }

    fn scan_keyword(&mut self, keyword: &str, kind: TokenKind) -> Result<Token, FormatError> {
        self.mark_token_start();
        for expected in keyword.bytes() {
            match self.peek() {
                None => return Err(self.fail("Unexpected end of input in keyword")),
                Some(b) if b == expected => self.bump(),
                Some(_) => return Err(self.fail("Unrecognized keyword")),
            }
        }
        Ok(self.token_here(kind, keyword))
    }

    fn scan_comment(&mut self) -> Result<Token, FormatError> {
        self.mark_token_start();
        self.bump();

        let is_block = match self.peek() {
            Some(b'*') => true,
            Some(b'/') => false,
            _ => return Err(self.fail("Bad character for start of comment")),
        };
        self.bump();

        let mut prev_was_asterisk = false;
        loop {
            match self.peek() {
                None => {
                    if is_block {
                        return Err(self.fail("Unexpected end of input in block comment"));
                    }
                    return Ok(self.token_from_span(TokenKind::LineComment, true));
                }
                Some(b'\n') => {
                    self.bump_newline();
                    if !is_block {
                        return Ok(self.token_from_span(TokenKind::LineComment, true));
                    }
                    prev_was_asterisk = false;
                }
                Some(b) => {
                    self.bump();
                    if b == b'/' && prev_was_asterisk {
                        return Ok(self.token_from_span(TokenKind::BlockComment, false));
                    }
                    prev_was_asterisk = b == b'*';
                }
            }
        }
    }

    fn scan_string(&mut self) -> Result<Token, FormatError> {
        self.mark_token_start();
        self.bump();

        let mut pending_escape = false;
        let mut pending_hex = 0usize;
        loop {
            let b = match self.peek() {
                None => return Err(self.fail("Unexpected end of input in string")),
                Some(b) => b,
            };

            if pending_hex > 0 {
                if !b.is_ascii_hexdigit() {
                    return Err(self.fail("Bad unicode escape in string"));
                }
                pending_hex -= 1;
                self.bump();
                continue;
            }

            if pending_escape {
                if !matches!(b, b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' | b'u') {
                    return Err(self.fail("Bad escaped character in string"));
                }
                if b == b'u' {
                    pending_hex = 4;
                }
                pending_escape = false;
                self.bump();
                continue;
            }

            if b <= 0x1F || b == 0x7F {
                return Err(self.fail("Control characters are not allowed in strings"));
            }

            self.bump();
            match b {
                b'"' => return Ok(self.token_from_span(TokenKind::String, false)),
                b'\\' => pending_escape = true,
                _ => {}
            }
        }
    }

    fn scan_number(&mut self) -> Result<Token, FormatError> {
        self.mark_token_start();
        let mut phase = NumberPhase::Beginning;

        loop {
            let b = match self.peek() {
                Some(b) => b,
                None => {
                    // A number can legally end the document only after a
                    // complete whole, fractional, or exponent part.
                    return match phase {
                        NumberPhase::PastFirstDigitOfWhole
                        | NumberPhase::PastWhole
                        | NumberPhase::PastFirstDigitOfFractional
                        | NumberPhase::PastFirstDigitOfExponent => {
                            Ok(self.token_from_span(TokenKind::Number, false))
                        }
                        _ => Err(self.fail("Unexpected end of input in number")),
                    };
                }
            };

            let next_phase = match phase {
                NumberPhase::Beginning => match b {
                    b'-' => Some(NumberPhase::PastLeadingSign),
                    b'0' => Some(NumberPhase::PastWhole),
                    b'1'..=b'9' => Some(NumberPhase::PastFirstDigitOfWhole),
                    _ => None,
                },
                NumberPhase::PastLeadingSign => match b {
                    b'0' => Some(NumberPhase::PastWhole),
                    b'1'..=b'9' => Some(NumberPhase::PastFirstDigitOfWhole),
                    _ => None,
                },
                NumberPhase::PastFirstDigitOfWhole => match b {
                    b'.' => Some(NumberPhase::PastDecimalPoint),
                    b'e' | b'E' => Some(NumberPhase::PastE),
                    b'0'..=b'9' => Some(NumberPhase::PastFirstDigitOfWhole),
                    _ => return Ok(self.token_from_span(TokenKind::Number, false)),
                },
                // A leading zero forbids further whole digits.
                NumberPhase::PastWhole => match b {
                    b'.' => Some(NumberPhase::PastDecimalPoint),
                    b'e' | b'E' => Some(NumberPhase::PastE),
                    _ => return Ok(self.token_from_span(TokenKind::Number, false)),
                },
                NumberPhase::PastDecimalPoint => match b {
                    b'0'..=b'9' => Some(NumberPhase::PastFirstDigitOfFractional),
                    _ => None,
                },
                NumberPhase::PastFirstDigitOfFractional => match b {
                    b'e' | b'E' => Some(NumberPhase::PastE),
                    b'0'..=b'9' => Some(NumberPhase::PastFirstDigitOfFractional),
                    _ => return Ok(self.token_from_span(TokenKind::Number, false)),
                },
                NumberPhase::PastE => match b {
                    b'+' | b'-' => Some(NumberPhase::PastExpSign),
                    b'0'..=b'9' => Some(NumberPhase::PastFirstDigitOfExponent),
                    _ => None,
                },
                NumberPhase::PastExpSign => match b {
                    b'0'..=b'9' => Some(NumberPhase::PastFirstDigitOfExponent),
                    _ => None,
                },
                NumberPhase::PastFirstDigitOfExponent => match b {
                    b'0'..=b'9' => Some(NumberPhase::PastFirstDigitOfExponent),
                    _ => return Ok(self.token_from_span(TokenKind::Number, false)),
                },
            };

            match next_phase {
                Some(p) => {
                    phase = p;
                    self.bump();
                }
                None => return Err(self.fail("Bad character in number")),
            }
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.size_checked {
            self.size_checked = true;
            if self.bytes.len() > MAX_INPUT_BYTES {
                return Some(Err(FormatError::plain("Maximum document size exceeded")));
            }
        }

        loop {
            let b = self.peek()?;
            match b {
                b' ' | b'\t' | b'\r' => self.bump_quiet(),
                b'\n' => {
                    if !self.ink_on_line {
                        self.mark_token_start();
                        self.bump_newline();
                        return Some(Ok(self.token_here(TokenKind::BlankLine, "\n")));
                    }
                    self.bump_newline();
                }
                b'{' => return Some(self.scan_punctuation("{", TokenKind::BeginObject)),
                b'}' => return Some(self.scan_punctuation("}", TokenKind::EndObject)),
                b'[' => return Some(self.scan_punctuation("[", TokenKind::BeginArray)),
                b']' => return Some(self.scan_punctuation("]", TokenKind::EndArray)),
                b':' => return Some(self.scan_punctuation(":", TokenKind::Colon)),
                b',' => return Some(self.scan_punctuation(",", TokenKind::Comma)),
                b't' => return Some(self.scan_keyword("true", TokenKind::True)),
                b'f' => return Some(self.scan_keyword("false", TokenKind::False)),
                b'n' => return Some(self.scan_keyword("null", TokenKind::Null)),
                b'/' => return Some(self.scan_comment()),
                b'"' => return Some(self.scan_string()),
                b'-' | b'0'..=b'9' => return Some(self.scan_number()),
                _ => return Some(Err(self.fail("Unexpected character"))),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberPhase {
    Beginning,
    PastLeadingSign,
    PastFirstDigitOfWhole,
    PastWhole,
    PastDecimalPoint,
    PastFirstDigitOfFractional,
    PastE,
    PastExpSign,
    PastFirstDigitOfExponent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tokens(text: &str) -> Result<Vec<Token>, FormatError> {
        Scanner::new(text).collect()
    }

    fn kinds(text: &str) -> Vec<TokenKind> {
        all_tokens(text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_simple_object() {
        assert_eq!(
            kinds(r#"{"a":1}"#),
            vec![
                TokenKind::BeginObject,
                TokenKind::String,
                TokenKind::Colon,
                TokenKind::Number,
                TokenKind::EndObject,
            ]
        );
    }

    #[test]
    fn blank_lines_become_tokens_and_terminate() {
        let toks = all_tokens("1\n\n\n2").unwrap();
        let blanks = toks.iter().filter(|t| t.kind == TokenKind::BlankLine).count();
        assert_eq!(blanks, 2);
    }

    #[test]
    fn leading_blank_line_is_reported() {
        assert_eq!(kinds("\nnull")[0], TokenKind::BlankLine);
    }

    #[test]
    fn number_token_keeps_original_digits() {
        let toks = all_tokens("[1.50e2,0.25]").unwrap();
        assert_eq!(toks[1].text, "1.50e2");
        assert_eq!(toks[3].text, "0.25");
    }

    #[test]
    fn leading_zero_forbids_more_whole_digits() {
        assert!(all_tokens("01").is_err());
        assert!(all_tokens("0.1").is_ok());
        assert!(all_tokens("-0.5").is_ok());
    }

    #[test]
    fn exponent_requires_a_digit() {
        assert!(all_tokens("1e").is_err());
        assert!(all_tokens("1e+").is_err());
        assert!(all_tokens("1e+3").is_ok());
    }

    #[test]
    fn bare_minus_is_rejected() {
        assert!(all_tokens("-").is_err());
    }

    #[test]
    fn string_escapes() {
        assert!(all_tokens(r#""a\n\tÿ""#).is_ok());
        assert!(all_tokens(r#""a\q""#).is_err());
        assert!(all_tokens(r#""a\u00G0""#).is_err());
    }

    #[test]
    fn control_bytes_rejected_but_multibyte_allowed() {
        assert!(all_tokens("\"a\u{0007}b\"").is_err());
        assert!(all_tokens("\"a\u{7f}b\"").is_err());
        // Multibyte UTF-8 continuation bytes are above 0x7F and must pass.
        let toks = all_tokens("\"héllo — 世界\"").unwrap();
        assert_eq!(toks[0].text, "\"héllo — 世界\"");
    }

    #[test]
    fn keywords_must_match_exactly() {
        assert!(all_tokens("truthy").is_err());
        assert!(all_tokens("nul").is_err());
        assert_eq!(kinds("true"), vec![TokenKind::True]);
    }

    #[test]
    fn comments_are_scanned_with_positions() {
        let toks = all_tokens("// line\n/* block */").unwrap();
        assert_eq!(toks[0].kind, TokenKind::LineComment);
        assert_eq!(toks[0].text, "// line");
        assert_eq!(toks[1].kind, TokenKind::BlockComment);
        assert_eq!(toks[1].text, "/* block */");
        assert_eq!(toks[1].position.row, 1);
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert!(all_tokens("/* nope").is_err());
    }

    #[test]
    fn positions_track_rows_and_columns() {
        let toks = all_tokens("{\n  \"a\": 1\n}").unwrap();
        let name = &toks[1];
        assert_eq!(name.position.row, 1);
        assert_eq!(name.position.column, 2);
    }
}
