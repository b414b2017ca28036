/// Compile-time strictness, selected by the host via `compile(mode)`.
///
/// This is the single user-facing configuration surface the core defines; it
/// governs which passes run (initialization analysis only runs in [`CompileMode::Strict`])
/// and how [`crate::Severity`] is derived from a diagnostic's natural severity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CompileMode {
    /// Demotes most warnings; used for exploratory authoring.
    BestEffort,
    /// Default middle ground: warnings stay warnings, LWW ambiguity is still a warning.
    Pragmatic,
    /// Promotes LWW write-policy ambiguity and missing initial values to errors; runs the
    /// initialization pass.
    Strict,
}

impl Default for CompileMode {
    fn default() -> Self {
        Self::Pragmatic
    }
}
