use crate::dom::{Element, ElementKind, TextPosition, Token, TokenKind};
use crate::error::FormatError;
use crate::options::{CommentPolicy, FormatOptions};
use crate::scanner::Scanner;

/// One-token window over the scanner, so container parsers can ask "what
/// row did the element's last token end on" after a recursive descent.
struct TokenSource<I>
where
    I: Iterator<Item = Result<Token, FormatError>>,
{
    tokens: I,
    current: Option<Token>,
}

impl<I> TokenSource<I>
where
    I: Iterator<Item = Result<Token, FormatError>>,
{
    fn new(tokens: I) -> Self {
        Self { tokens, current: None }
    }

    fn current(&self) -> Result<&Token, FormatError> {
        self.current
            .as_ref()
            .ok_or_else(|| FormatError::plain("Token source read before advancing"))
    }

    fn advance(&mut self) -> Result<bool, FormatError> {
        match self.tokens.next() {
            None => {
                self.current = None;
                Ok(false)
            }
            Some(Ok(token)) => {
                self.current = Some(token);
                Ok(true)
            }
            Some(Err(err)) => Err(err),
        }
    }
}

/// Recursive-descent parser producing the element tree.
///
/// Beyond the JSON grammar itself, the parser's main job is deciding which
/// element each comment and blank line belongs to, so the formatter can
/// carry them through layout changes.
pub struct Parser {
    pub options: FormatOptions,
}

impl Parser {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Parse a whole document. With `single_value`, a second top-level
    /// value is an error; comments and blank lines may still surround it.
    pub fn parse_document(
        &self,
        text: &str,
        single_value: bool,
    ) -> Result<Vec<Element>, FormatError> {
        let mut source = TokenSource::new(Scanner::new(text));
        let mut elements: Vec<Element> = Vec::new();
        let mut value_seen = false;

        while source.advance()? {
            let element = self.parse_element(&mut source)?;
            match element.kind {
                ElementKind::BlankLine => {
                    if self.options.preserve_blank_lines {
                        elements.push(element);
                    }
                }
                ElementKind::LineComment | ElementKind::BlockComment => {
                    match self.options.comment_policy {
                        CommentPolicy::TreatAsError => {
                            return Err(FormatError::at(
                                "Comments not allowed with current options",
                                element.position,
                            ));
                        }
                        CommentPolicy::Remove => {}
                        CommentPolicy::Preserve => elements.push(element),
                    }
                }
                _ => {
                    if single_value && value_seen {
                        return Err(FormatError::at(
                            "Unexpected second top-level value",
                            element.position,
                        ));
                    }
                    value_seen = true;
                    elements.push(element);
                }
            }
        }

        Ok(elements)
    }

    fn parse_element<I>(&self, source: &mut TokenSource<I>) -> Result<Element, FormatError>
    where
        I: Iterator<Item = Result<Token, FormatError>>,
    {
        match source.current()?.kind {
            TokenKind::BeginArray => self.parse_array(source),
            TokenKind::BeginObject => self.parse_object(source),
            _ => {
                let token = source.current()?.clone();
                self.parse_scalar(&token)
            }
        }
    }

    fn parse_scalar(&self, token: &Token) -> Result<Element, FormatError> {
        let kind = match token.kind {
            TokenKind::Null => ElementKind::Null,
            TokenKind::True => ElementKind::True,
            TokenKind::False => ElementKind::False,
            TokenKind::String => ElementKind::String,
            TokenKind::Number => ElementKind::Number,
            TokenKind::BlankLine => ElementKind::BlankLine,
            TokenKind::LineComment => ElementKind::LineComment,
            TokenKind::BlockComment => ElementKind::BlockComment,
            _ => {
                return Err(FormatError::at("Unexpected token", token.position));
            }
        };
        let mut element = Element::new(kind, token.position);
        element.value = token.text.clone();
        Ok(element)
    }

    fn parse_array<I>(&self, source: &mut TokenSource<I>) -> Result<Element, FormatError>
    where
        I: Iterator<Item = Result<Token, FormatError>>,
    {
        let open_position = source.current()?.position;
        debug_assert_eq!(source.current()?.kind, TokenKind::BeginArray);

        let mut children: Vec<Element> = Vec::new();
        let mut comma_state = CommaState::EmptyCollection;
        let mut complexity = 0usize;

        // A single-line comment whose home isn't known yet: it becomes a
        // prefix of the next element on the same row, a postfix of the
        // previous element, or a standalone row.
        let mut drifting_comment: Option<Element> = None;
        // Index of the element that may still claim a postfix comment, and
        // the row on which that element ended.
        let mut postfix_idx: Option<usize> = None;
        let mut postfix_row: isize = -1;

        loop {
            let token = next_in_container(source, open_position)?;

            let drifting_needs_home = drifting_comment.as_ref().is_some_and(|c| {
                c.position.row != token.position.row || token.kind == TokenKind::EndArray
            });
            if drifting_needs_home {
                let comment = drifting_comment.take().unwrap();
                match postfix_idx {
                    Some(idx) => {
                        let element = &mut children[idx];
                        element.postfix_comment = comment.value;
                        element.is_post_comment_line_style =
                            comment.kind == ElementKind::LineComment;
                    }
                    None => children.push(comment),
                }
            }

            if postfix_idx.is_some() && postfix_row != token.position.row as isize {
                postfix_idx = None;
            }

            match token.kind {
                TokenKind::EndArray => {
                    if comma_state == CommaState::CommaSeen && !self.options.allow_trailing_commas {
                        return Err(FormatError::at(
                            "Array may not end with a comma with current options",
                            token.position,
                        ));
                    }
                    break;
                }
                TokenKind::Comma => {
                    if comma_state != CommaState::ElementSeen {
                        return Err(FormatError::at("Unexpected comma in array", token.position));
                    }
                    comma_state = CommaState::CommaSeen;
                }
                TokenKind::BlankLine => {
                    if self.options.preserve_blank_lines {
                        children.push(self.parse_scalar(&token)?);
                    }
                }
                TokenKind::BlockComment => {
                    if self.comment_check(&token)? {
                        continue;
                    }
                    if let Some(comment) = drifting_comment.take() {
                        children.push(comment);
                    }

                    let comment = self.parse_scalar(&token)?;
                    if is_multiline_block_comment(&comment) {
                        children.push(comment);
                        continue;
                    }
                    // Directly after an element (no comma yet) a block
                    // comment is its postfix.
                    if comma_state == CommaState::ElementSeen {
                        if let Some(idx) = postfix_idx.take() {
                            let element = &mut children[idx];
                            element.postfix_comment = comment.value;
                            element.is_post_comment_line_style = false;
                            continue;
                        }
                    }
                    drifting_comment = Some(comment);
                }
                TokenKind::LineComment => {
                    if self.comment_check(&token)? {
                        continue;
                    }
                    if let Some(comment) = drifting_comment.take() {
                        children.push(comment);
                        children.push(self.parse_scalar(&token)?);
                        continue;
                    }
                    if let Some(idx) = postfix_idx.take() {
                        let element = &mut children[idx];
                        element.postfix_comment = token.text.clone();
                        element.is_post_comment_line_style = true;
                        continue;
                    }
                    children.push(self.parse_scalar(&token)?);
                }
                TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::BeginArray
                | TokenKind::BeginObject => {
                    if comma_state == CommaState::ElementSeen {
                        return Err(FormatError::at(
                            "Comma missing between array elements",
                            token.position,
                        ));
                    }

                    let mut element = self.parse_element(source)?;
                    comma_state = CommaState::ElementSeen;
                    complexity = complexity.max(element.complexity + 1);

                    if let Some(comment) = drifting_comment.take() {
                        element.prefix_comment = comment.value;
                    }

                    children.push(element);
                    postfix_idx = Some(children.len() - 1);
                    postfix_row = source.current()?.position.row as isize;
                }
                _ => {
                    return Err(FormatError::at("Unexpected token in array", token.position));
                }
            }
        }

        let mut array = Element::new(ElementKind::Array, open_position);
        array.complexity = complexity;
        array.children = children;
        Ok(array)
    }

    fn parse_object<I>(&self, source: &mut TokenSource<I>) -> Result<Element, FormatError>
    where
        I: Iterator<Item = Result<Token, FormatError>>,
    {
        let open_position = source.current()?.position;
        debug_assert_eq!(source.current()?.kind, TokenKind::BeginObject);

        let mut children: Vec<Element> = Vec::new();
        let mut phase = ObjectPhase::BeforePropName;
        let mut complexity = 0usize;

        // Pieces of the member currently being assembled.
        let mut member_name: Option<Token> = None;
        let mut member_value: Option<Element> = None;
        let mut value_end_row: isize = -1;
        let mut leading_comments: Vec<Element> = Vec::new();
        let mut middle_comments: Vec<Token> = Vec::new();
        let mut trailing_comment: Option<Element> = None;
        let mut trailing_was_after_comma = false;

        loop {
            let token = next_in_container(source, open_position)?;

            let row_changed = value_end_row != token.position.row as isize;
            let closing = token.kind == TokenKind::EndObject;
            let next_name_starting =
                token.kind == TokenKind::String && phase == ObjectPhase::AfterComma;
            let excess_trailing = trailing_comment.is_some()
                && matches!(token.kind, TokenKind::BlockComment | TokenKind::LineComment);

            if member_name.is_some()
                && member_value.is_some()
                && (row_changed || closing || next_name_starting || excess_trailing)
            {
                // A comment that followed the comma on the same line really
                // leads the next member, not this one.
                let mut carry_over: Option<Element> = None;
                if next_name_starting && trailing_was_after_comma && !row_changed {
                    carry_over = trailing_comment.take();
                }

                let value = member_value.take().unwrap();
                complexity = complexity.max(value.complexity + 1);
                flush_member(
                    &mut children,
                    member_name.take().unwrap(),
                    value,
                    value_end_row,
                    &mut leading_comments,
                    &mut middle_comments,
                    trailing_comment.take(),
                );

                if let Some(comment) = carry_over {
                    leading_comments.push(comment);
                }
            }

            match token.kind {
                TokenKind::BlankLine => {
                    if !self.options.preserve_blank_lines {
                        continue;
                    }
                    // Blank lines between a name and its value would tear
                    // the member apart; drop them.
                    if matches!(phase, ObjectPhase::AfterPropName | ObjectPhase::AfterColon) {
                        continue;
                    }
                    children.append(&mut leading_comments);
                    children.push(self.parse_scalar(&token)?);
                }
                TokenKind::BlockComment | TokenKind::LineComment => {
                    if self.comment_check(&token)? {
                        continue;
                    }
                    if phase == ObjectPhase::BeforePropName || member_name.is_none() {
                        leading_comments.push(self.parse_scalar(&token)?);
                    } else if matches!(phase, ObjectPhase::AfterPropName | ObjectPhase::AfterColon)
                    {
                        middle_comments.push(token);
                    } else {
                        trailing_comment = Some(self.parse_scalar(&token)?);
                        trailing_was_after_comma = phase == ObjectPhase::AfterComma;
                    }
                }
                TokenKind::EndObject => {
                    if matches!(phase, ObjectPhase::AfterPropName | ObjectPhase::AfterColon) {
                        return Err(FormatError::at("Unexpected end of object", token.position));
                    }
                    if phase == ObjectPhase::AfterComma && !self.options.allow_trailing_commas {
                        return Err(FormatError::at(
                            "Object may not end with a comma with current options",
                            token.position,
                        ));
                    }
                    break;
                }
                TokenKind::String => match phase {
                    ObjectPhase::BeforePropName | ObjectPhase::AfterComma => {
                        member_name = Some(token);
                        phase = ObjectPhase::AfterPropName;
                    }
                    ObjectPhase::AfterColon => {
                        member_value = Some(self.parse_element(source)?);
                        value_end_row = source.current()?.position.row as isize;
                        phase = ObjectPhase::AfterPropValue;
                    }
                    _ => {
                        return Err(FormatError::at(
                            "Unexpected string in object",
                            token.position,
                        ));
                    }
                },
                TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Number
                | TokenKind::BeginArray
                | TokenKind::BeginObject => {
                    if phase != ObjectPhase::AfterColon {
                        return Err(FormatError::at(
                            "Unexpected element in object",
                            token.position,
                        ));
                    }
                    member_value = Some(self.parse_element(source)?);
                    value_end_row = source.current()?.position.row as isize;
                    phase = ObjectPhase::AfterPropValue;
                }
                TokenKind::Colon => {
                    if phase != ObjectPhase::AfterPropName {
                        return Err(FormatError::at(
                            "Unexpected colon in object",
                            token.position,
                        ));
                    }
                    phase = ObjectPhase::AfterColon;
                }
                TokenKind::Comma => {
                    if phase != ObjectPhase::AfterPropValue {
                        return Err(FormatError::at(
                            "Unexpected comma in object",
                            token.position,
                        ));
                    }
                    phase = ObjectPhase::AfterComma;
                }
                _ => {
                    return Err(FormatError::at("Unexpected token in object", token.position));
                }
            }
        }

        // Comments left over before the closing brace stand alone.
        children.append(&mut leading_comments);

        let mut object = Element::new(ElementKind::Object, open_position);
        object.complexity = complexity;
        object.children = children;
        Ok(object)
    }

    /// Returns Ok(true) when the comment should be skipped entirely.
    fn comment_check(&self, token: &Token) -> Result<bool, FormatError> {
        match self.options.comment_policy {
            CommentPolicy::TreatAsError => Err(FormatError::at(
                "Comments not allowed with current options",
                token.position,
            )),
            CommentPolicy::Remove => Ok(true),
            CommentPolicy::Preserve => Ok(false),
        }
    }
}

fn next_in_container<I>(
    source: &mut TokenSource<I>,
    open_position: TextPosition,
) -> Result<Token, FormatError>
where
    I: Iterator<Item = Result<Token, FormatError>>,
{
    if !source.advance()? {
        return Err(FormatError::at(
            "Unexpected end of input inside the container starting",
            open_position,
        ));
    }
    Ok(source.current()?.clone())
}

fn is_multiline_block_comment(element: &Element) -> bool {
    element.kind == ElementKind::BlockComment && element.value.contains('\n')
}

/// Assemble a finished object member from its pieces and append it, along
/// with any standalone comment rows that accumulated around it.
fn flush_member(
    children: &mut Vec<Element>,
    name: Token,
    mut element: Element,
    value_end_row: isize,
    leading_comments: &mut Vec<Element>,
    middle_comments: &mut Vec<Token>,
    trailing_comment: Option<Element>,
) {
    element.name = name.text;

    if !middle_comments.is_empty() {
        let mut combined = String::new();
        let last = middle_comments.len() - 1;
        for (i, comment) in middle_comments.drain(..).enumerate() {
            combined.push_str(&comment.text);
            // Line comments and comment sequences get a newline marker so
            // the emitter knows it can't stay on one line.
            if i < last || comment.kind == TokenKind::LineComment {
                combined.push('\n');
            }
        }
        element.middle_comment_has_newline = combined.contains('\n');
        element.middle_comment = combined;
    }

    if let Some(last) = leading_comments.pop() {
        if last.kind == ElementKind::BlockComment && last.position.row == element.position.row {
            element.prefix_comment = last.value;
            children.append(leading_comments);
        } else {
            children.append(leading_comments);
            children.push(last);
        }
    }

    children.push(element);

    if let Some(after) = trailing_comment {
        if !is_multiline_block_comment(&after) && after.position.row as isize == value_end_row {
            let element = children.last_mut().unwrap();
            element.postfix_comment = after.value;
            element.is_post_comment_line_style = after.kind == ElementKind::LineComment;
        } else {
            children.push(after);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommaState {
    EmptyCollection,
    ElementSeen,
    CommaSeen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectPhase {
    BeforePropName,
    AfterPropName,
    AfterColon,
    AfterPropValue,
    AfterComma,
}
