use crate::options::GenerateOptions;

/// Line accumulator tracking the current indentation level.
#[derive(Debug, Clone)]
pub struct SqlWriter {
    buf: String,
    depth: usize,
    unit: String,
}

impl SqlWriter {
    pub fn new(options: &GenerateOptions) -> Self {
        Self::with_indent(options.indent_unit())
    }

    pub fn with_indent(unit: impl Into<String>) -> Self {
        Self {
            buf: String::new(),
            depth: 0,
            unit: unit.into(),
        }
    }

    /// Append one line at the current indentation. Empty text yields a bare newline.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(&self.unit);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
        self
    }

    /// Append multi-line text line by line, e.g. an opaque SQL body.
    pub fn lines(&mut self, text: &str) -> &mut Self {
        for line in text.trim_end().lines() {
            self.line(line);
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    /// Append already rendered text as is.
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buf.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_indentation() {
        let mut writer = SqlWriter::with_indent("  ");
        writer.line("CREATE TABLE t (");
        writer.indent().line("id integer").line("");
        writer.dedent().dedent().line(");");
        assert_eq!(writer.finish(), "CREATE TABLE t (\n  id integer\n\n);\n");
    }

    #[test]
    fn tab_indent_from_options() {
        let options = GenerateOptions {
            use_tab: true,
            ..GenerateOptions::default()
        };
        let mut writer = SqlWriter::new(&options);
        writer.indent().lines("a\nb\n");
        assert_eq!(writer.as_str(), "\ta\n\tb\n");
        assert!(!writer.is_empty());
    }
}
