use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Progress narration.
    Info,
    /// Non-fatal naming or model issue.
    Warning,
    /// Aborts the current element, sub-generator or run.
    Error,
}

/// Structured message reported during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            element: None,
            message: message.into(),
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn for_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }
}

/// Receiver of diagnostics, usually a user-facing surface.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectedDiagnostics {
    pub items: Vec<Diagnostic>,
}

impl CollectedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(move |diagnostic| diagnostic.severity == severity)
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.with_severity(Severity::Error).collect()
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.with_severity(Severity::Warning).collect()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.items.iter().any(|diagnostic| diagnostic.code == code)
    }
}

impl DiagnosticSink for CollectedDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }
}

/// Forwards diagnostics to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        let element = diagnostic.element.as_deref().unwrap_or("");
        match diagnostic.severity {
            Severity::Info => info!(code = %diagnostic.code, element, "{}", diagnostic.message),
            Severity::Warning => warn!(code = %diagnostic.code, element, "{}", diagnostic.message),
            Severity::Error => error!(code = %diagnostic.code, element, "{}", diagnostic.message),
        }
    }
}

/// Wraps another sink and counts warnings and errors on the way through.
pub(crate) struct CountingSink<'a> {
    inner: &'a mut dyn DiagnosticSink,
    pub warnings: u64,
    pub errors: u64,
}

impl<'a> CountingSink<'a> {
    pub(crate) fn new(inner: &'a mut dyn DiagnosticSink) -> Self {
        Self {
            inner,
            warnings: 0,
            errors: 0,
        }
    }
}

impl DiagnosticSink for CountingSink<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => {}
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }
        self.inner.report(diagnostic);
    }
}
