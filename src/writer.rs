/// Write-only output buffer that assembles one line at a time.
///
/// Pieces accumulate until `end_line`, which right-trims the pending line
/// before flushing it. Column padding can therefore be written eagerly
/// without ever leaving trailing whitespace in the document.
#[derive(Debug, Default)]
pub struct LineWriter {
    line: String,
    doc: String,
}

const SPACE_CHUNK: &str = "                                ";

impl LineWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, piece: &str) -> &mut Self {
        self.line.push_str(piece);
        self
    }

    pub fn spaces(&mut self, mut count: usize) -> &mut Self {
        while count > 0 {
            let take = count.min(SPACE_CHUNK.len());
            self.line.push_str(&SPACE_CHUNK[..take]);
            count -= take;
        }
        self
    }

    /// True when the current line already holds content.
    pub fn line_in_progress(&self) -> bool {
        !self.line.is_empty()
    }

    pub fn end_line(&mut self, eol: &str) -> &mut Self {
        self.trim_line_end();
        self.doc.push_str(&self.line);
        self.doc.push_str(eol);
        self.line.clear();
        self
    }

    /// Flush any pending partial line without a line terminator.
    pub fn flush(&mut self) -> &mut Self {
        if !self.line.is_empty() {
            self.trim_line_end();
            self.doc.push_str(&self.line);
            self.line.clear();
        }
        self
    }

    pub fn into_string(mut self) -> String {
        self.flush();
        self.doc
    }

    fn trim_line_end(&mut self) {
        let trimmed = self.line.trim_end().len();
        self.line.truncate(trimmed);
    }
}
