use crate::value::ElementType;

/// Hard failures raised by [`crate::builder::GraphBuilder`] itself. These are
/// distinct from the [`flowcore_diagnostics::DiagnosticSink`]-routed findings of the
/// analysis passes: a builder error means the *host embedding the core* passed a
/// malformed descriptor, not that an author's graph is semantically questionable.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IrError {
    #[error("duplicate node identity `{0}`")]
    DuplicateNode(String),
    #[error("duplicate variable identity `{0}`")]
    DuplicateVariable(String),
    #[error("unknown node `{0}`")]
    UnknownNode(String),
    #[error("unknown port `{0}` on node `{1}`")]
    UnknownPort(String, String),
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("port `{0}` is not an output port")]
    NotAnOutput(String),
    #[error("port `{0}` is not an input port")]
    NotAnInput(String),
    #[error("type mismatch connecting `{from}` ({from_ty}) to `{to}` ({to_ty})")]
    TypeMismatch {
        from: String,
        from_ty: ElementType,
        to: String,
        to_ty: ElementType,
    },
    #[error("input `{0}` already has a connected source (fan-in > 1)")]
    FanInViolation(String),
    #[error(transparent)]
    Expr(#[from] crate::expr::ExprError),
}
