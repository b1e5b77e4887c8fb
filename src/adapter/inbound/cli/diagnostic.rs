//! Miette diagnostics for errors that point into a file.
//!
//! The struct fields are read by miette's derive macros when the report is
//! rendered.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A configuration file that does not parse, with the offending span.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(revpace::config))]
pub struct ConfigDiagnostic {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: SourceSpan,

    #[help]
    pub help: Option<String>,
}

impl ConfigDiagnostic {
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        name: impl AsRef<str>,
        src: impl Into<String>,
        offset: usize,
        len: usize,
    ) -> Self {
        Self {
            message: message.into(),
            src: NamedSource::new(name, src.into()),
            span: (offset, len).into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Build from a TOML error when it carries a location.
    #[must_use]
    pub fn from_toml(name: impl AsRef<str>, src: &str, err: &toml::de::Error) -> Option<Self> {
        let span = err.span()?;
        let len = span.end.saturating_sub(span.start).max(1);
        let diagnostic = Self::new(err.message(), name, src, span.start, len)
            .with_help("see `revpace config init` for a documented template");
        Some(diagnostic)
    }
}

/// Render a diagnostic to stderr with source context.
pub fn report(diagnostic: ConfigDiagnostic) {
    eprintln!("{:?}", miette::Report::new(diagnostic));
}
