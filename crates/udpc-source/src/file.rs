use miette::SourceSpan;
use std::sync::Arc;

/// A source file handed to the compiler by the front-end.
///
/// Only used to turn byte spans into human readable locations and to give
/// rendered reports their source context. The IR itself stores spans.
///
/// # Fields
///
/// * `name` - The path or display name of the file
/// * `contents` - The raw text content of the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: Arc<str>,
    contents: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<Arc<str>>, contents: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// 1-based line and column of a byte offset. Offsets past the end clamp
    /// to the last position of the file.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.contents.len());
        let before = &self.contents[..floor_char_boundary(&self.contents, offset)];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        (line, column)
    }

    /// Formats `span` as `name:line:col`.
    pub fn location(&self, span: SourceSpan) -> String {
        let (line, column) = self.line_col(span.offset());
        format!("{}:{}:{}", self.name, line, column)
    }
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_first_line() {
        let file = SourceFile::new("and2.v", "primitive and2 (q, a, b);");
        assert_eq!(file.line_col(0), (1, 1));
        assert_eq!(file.line_col(10), (1, 11));
    }

    #[test]
    fn test_line_col_after_newline() {
        let file = SourceFile::new("and2.v", "table\n  0 1 : 0;\nendtable\n");
        assert_eq!(file.line_col(6), (2, 1));
        assert_eq!(file.line_col(8), (2, 3));
        assert_eq!(file.location(SourceSpan::from((17, 8))), "and2.v:3:1");
    }

    #[test]
    fn test_line_col_clamps_past_end() {
        let file = SourceFile::new("t.v", "ab");
        assert_eq!(file.line_col(100), (1, 3));
    }
}
