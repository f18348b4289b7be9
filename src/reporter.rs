use std::fmt;
use std::sync::Arc;

use crate::ast::{CodeRange, PositionIndex};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub range: CodeRange,
    pub message: String,
}

/// Collects diagnostics against one immutable source text.
///
/// The reporter itself never aborts anything. Callers decide when the
/// collected diagnostics turn into a failure by calling [`ErrorReporter::raise`]
/// (the parser does so on its first problem) or
/// [`ErrorReporter::raise_if_reported`] (the checker does so once, after all of
/// its passes).
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    text: Arc<str>,
    index: PositionIndex,
    diagnostics: Vec<Diagnostic>,
}

impl ErrorReporter {
    pub fn from_text(text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let index = PositionIndex::new(&text);
        Self {
            text,
            index,
            diagnostics: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn shared_text(&self) -> Arc<str> {
        self.text.clone()
    }

    pub fn report(&mut self, range: CodeRange, message: impl Into<String>) {
        let message = message.into();
        log::debug!("reported at {:?}: {}", range, message);
        self.diagnostics.push(Diagnostic { range, message });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// One-based (line, column) of a byte offset.
    pub fn line_col(&self, pos: usize) -> (usize, usize) {
        let (row, col) = self.index.rc_of(pos.min(self.text.len()));
        (row + 1, col + 1)
    }

    /// Drains every pending diagnostic into a single error.
    pub fn raise(&mut self) -> ReportedError {
        let diagnostics = std::mem::take(&mut self.diagnostics);
        let rendered = diagnostics
            .iter()
            .map(|diag| self.render(diag))
            .collect::<Vec<_>>()
            .join("\n");
        ReportedError {
            diagnostics,
            rendered,
        }
    }

    pub fn raise_if_reported(&mut self) -> Result<(), ReportedError> {
        if self.has_errors() {
            Err(self.raise())
        } else {
            Ok(())
        }
    }

    pub fn render(&self, diag: &Diagnostic) -> String {
        if diag.range.is_dummy() {
            return format!("error: {}", diag.message);
        }
        let (line, col) = self.line_col(diag.range.start);
        let line_start = self.text[..diag.range.start.min(self.text.len())]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let line_end = self.text[line_start..]
            .find('\n')
            .map_or(self.text.len(), |i| line_start + i);
        let line_text = &self.text[line_start..line_end];
        let underline_end = diag.range.end.clamp(diag.range.start, line_end);
        let width = self.text[diag.range.start.min(line_end)..underline_end]
            .chars()
            .count()
            .max(1);
        format!(
            "error:{}:{}: {}\n  {}\n  {}{}",
            line,
            col,
            diag.message,
            line_text,
            " ".repeat(col - 1),
            "^".repeat(width)
        )
    }
}

/// The aggregate failure of one parse or check: every diagnostic gathered by
/// that pass, pre-rendered against the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    diagnostics: Vec<Diagnostic>,
    rendered: String,
}

impl ReportedError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered)
    }
}

impl std::error::Error for ReportedError {}
