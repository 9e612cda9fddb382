// src/rewrite/buffer.rs
use std::borrow::Cow;

/// Source split into lines on `\n`. A `\r` stays at the end of its line, so
/// CRLF text survives a split and join untouched.
#[derive(Debug)]
pub struct Buffer<'a> {
    lines: Vec<Cow<'a, str>>,
    terminated: bool,
    terminator: &'static str,
}

impl<'a> Buffer<'a> {
    pub fn new(source: &'a str) -> Self {
        let crlf = source.matches("\r\n").count();
        let lf = source.matches('\n').count() - crlf;
        let terminator = if crlf > lf { "\r\n" } else { "\n" };

        let (body, terminated) = match source.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (source, false),
        };
        Self {
            lines: body.split('\n').map(Cow::Borrowed).collect(),
            terminated,
            terminator,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Collapses lines `start_line..=end_line` (1-based) into one line made of
    /// the text before `start_col`, `text`, and the text after `end_col`.
    /// Returns the byte length of the text that was cut out.
    pub fn replace(
        &mut self,
        start_line: usize,
        end_line: usize,
        start_col: usize,
        end_col: usize,
        text: &str,
    ) -> usize {
        let span = start_line - 1..end_line;
        let first = &self.lines[start_line - 1];
        let last = &self.lines[end_line - 1];

        let whole: usize = self.lines[span.clone()].iter().map(|l| l.len() + 1).sum();
        let removed = whole - 1 - start_col - (last.len() - end_col);

        let line = format!("{}{}{}", &first[..start_col], text, &last[end_col..]);
        self.lines.splice(span, [Cow::Owned(line)]);
        removed
    }

    /// Joins the lines back. The result always ends with one terminator.
    pub fn into_source(self) -> String {
        let mut out = self.lines.join("\n");
        out.push_str(if self.terminated { "\n" } else { self.terminator });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_buffer_keeps_text() {
        for src in ["a\nb\n", "a\r\nb\r\n", "\n", "a\n\n"] {
            assert_eq!(Buffer::new(src).into_source(), src);
        }
    }

    #[test]
    fn missing_terminator_uses_dominant_style() {
        assert_eq!(Buffer::new("a\nb").into_source(), "a\nb\n");
        assert_eq!(Buffer::new("a\r\nb\r\nc").into_source(), "a\r\nb\r\nc\r\n");
        assert_eq!(Buffer::new("x").into_source(), "x\n");
    }

    #[test]
    fn replace_collapses_span_and_keeps_edges() {
        let mut buf = Buffer::new("head\n  x = [\n1,\n2] # tail\nend\n");
        assert_eq!(buf.line_count(), 5);
        let removed = buf.replace(2, 4, 2, 2, "x = T");
        assert_eq!(removed, "x = [\n1,\n2]".len());
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.into_source(), "head\n  x = T # tail\nend\n");
    }

    #[test]
    fn replace_from_the_back_keeps_earlier_columns() {
        let mut buf = Buffer::new("a = [1]; b = [2]\r\n");
        assert_eq!(buf.replace(1, 1, 9, 16, "b = B"), 7);
        assert_eq!(buf.replace(1, 1, 0, 7, "a = A"), 7);
        assert_eq!(buf.into_source(), "a = A; b = B\r\n");
    }
}
