use std::fmt;

/// A human-readable handle to the IR entity a diagnostic is about.
///
/// Diagnostics are a leaf crate with no dependency on `flowcore-ir`'s arena keys, so refs
/// are carried by display name rather than by [`slotmap`](https://docs.rs/slotmap) key;
/// `flowcore-ir` and `flowcore-analysis` resolve their internal ids to names at the point
/// a diagnostic is raised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EntityRef {
    Node(String),
    Port(String),
    Variable(String),
    Reaction(String),
    State(String),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(name) => write!(f, "node `{name}`"),
            Self::Port(name) => write!(f, "port `{name}`"),
            Self::Variable(name) => write!(f, "variable `{name}`"),
            Self::Reaction(name) => write!(f, "reaction `{name}`"),
            Self::State(name) => write!(f, "state `{name}`"),
        }
    }
}
