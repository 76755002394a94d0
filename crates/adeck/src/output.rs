//! Styled lines for the terminal.

use console::{Style, Term};

/// Writes one styled line per message.
pub(crate) struct Output {
    term: Term,
    success: Style,
    warning: Style,
    error: Style,
    highlight: Style,
}

impl Output {
    /// Progress and diagnostics, on stderr.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::with_term(Term::stderr())
    }

    /// Command results meant to be piped, on stdout.
    #[must_use]
    pub(crate) fn stdout() -> Self {
        Self::with_term(Term::stdout())
    }

    fn with_term(term: Term) -> Self {
        Self {
            term,
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            highlight: Style::new().cyan().bold(),
        }
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.styled(&self.success, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&self.warning, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.error, msg);
    }

    pub(crate) fn highlight(&self, msg: &str) {
        self.styled(&self.highlight, msg);
    }
}
