use std::fmt::Write as _;

use crate::code::{DiagCode, Severity};
use crate::entity::EntityRef;
use crate::mode::CompileMode;

/// One diagnostic: a stable code, resolved severity, message, offending refs, and an
/// optional fix hint.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub code: DiagCode,
    pub severity: Severity,
    pub message: String,
    pub refs: Vec<EntityRef>,
    pub fix_hint: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagCode, mode: CompileMode, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity_under(mode),
            code,
            message: message.into(),
            refs: Vec::new(),
            fix_hint: None,
        }
    }

    pub fn with_ref(&mut self, entity: EntityRef) -> &mut Self {
        self.refs.push(entity);
        self
    }

    pub fn with_refs(&mut self, entities: impl IntoIterator<Item = EntityRef>) -> &mut Self {
        self.refs.extend(entities);
        self
    }

    pub fn with_fix_hint(&mut self, hint: impl Into<String>) -> &mut Self {
        self.fix_hint = Some(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Accumulates diagnostics across a compile run so authors see multiple problems per
/// run rather than stopping at the first.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    mode: CompileMode,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(mode: CompileMode) -> Self {
        Self {
            mode,
            diagnostics: Vec::new(),
        }
    }

    pub fn mode(&self) -> CompileMode {
        self.mode
    }

    /// Emit a diagnostic whose severity is resolved from `code` under this sink's mode.
    pub fn emit(&mut self, code: DiagCode, message: impl Into<String>) -> &mut Diagnostic {
        let diag = Diagnostic::new(code, self.mode, message);
        tracing::debug!(code = %diag.code, severity = ?diag.severity, "diagnostic emitted");
        self.diagnostics.push(diag);
        self.diagnostics.last_mut().expect("just pushed")
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the sink into a [`Report`].
    pub fn into_report(self) -> Report {
        Report {
            diagnostics: self.diagnostics,
        }
    }
}

/// The aggregated result of a compile run.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Report {
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        for diag in &self.diagnostics {
            let _ = write!(out, "[{}] {:?}: {}", diag.code, diag.severity, diag.message);
            for r in &diag.refs {
                let _ = write!(out, " ({r})");
            }
            if let Some(hint) = &diag.fix_hint {
                let _ = write!(out, " — hint: {hint}");
            }
            out.push('\n');
        }
        out
    }
}
