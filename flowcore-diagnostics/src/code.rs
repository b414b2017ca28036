use std::fmt;

use crate::mode::CompileMode;

/// Diagnostic reporting level. Distinct from a [`DiagCode`]'s *natural* severity:
/// the sink resolves the two against the active [`CompileMode`].
#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Stable diagnostic codes. Names are fixed wire/doc identifiers; `Display`
/// renders exactly the string form authors and tools key off of (e.g. `"CAUS003"`).
///
/// `SDF002` covers a case the stable diagnostic list otherwise has no code for: an SDF
/// subgraph that overlaps an SCC is rejected rather than silently given an undefined
/// schedule. See `DESIGN.md`.
#[non_exhaustive]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DiagCode {
    Struct001,
    Struct002,
    Type001,
    Write001,
    Write002,
    /// `WritePolicy::Monoid` declares `MonoidOp::Custom`, which the core has no generic
    /// merge implementation for; always an error regardless of mode.
    Write003,
    Caus001,
    Caus002,
    Caus003,
    Caus004,
    Init001,
    Init002,
    Init003,
    Zen001,
    Sdf001,
    /// SDF subgraph overlaps an algebraic SCC; conservatively rejected.
    Sdf002,
    /// A consistent firing vector exists but requires unbounded buffering under any
    /// admissible schedule; falls back to event-driven treatment rather than a static
    /// SDF schedule.
    Sdf003,
    Ct001,
    Ct002,
    Ct003,
    /// `ContinuousWrapper`'s `dt` input has no default, or a non-positive one.
    Ct004,
}

impl DiagCode {
    /// The severity this code carries before mode-dependent promotion/demotion.
    pub fn natural_severity(self) -> Severity {
        use DiagCode::*;
        match self {
            Struct001 | Struct002 | Write001 | Write003 | Caus001 | Caus002 | Caus003 | Caus004
            | Zen001 | Sdf001 | Sdf002 | Ct001 | Ct002 | Ct003 | Ct004 | Init001 => Severity::Error,
            Type001 | Write002 | Sdf003 => Severity::Warning,
            Init002 | Init003 => Severity::Error,
        }
    }

    /// Resolve this code's severity under a given [`CompileMode`].
    pub fn severity_under(self, mode: CompileMode) -> Severity {
        let natural = self.natural_severity();
        match mode {
            CompileMode::BestEffort => match natural {
                Severity::Warning => Severity::Info,
                other => other,
            },
            CompileMode::Pragmatic => natural,
            CompileMode::Strict => match self {
                DiagCode::Write002 => Severity::Error,
                _ => natural,
            },
        }
    }
}

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Struct001 => "STRUCT001",
            Self::Struct002 => "STRUCT002",
            Self::Type001 => "TYPE001",
            Self::Write001 => "WRITE001",
            Self::Write002 => "WRITE002",
            Self::Write003 => "WRITE003",
            Self::Caus001 => "CAUS001",
            Self::Caus002 => "CAUS002",
            Self::Caus003 => "CAUS003",
            Self::Caus004 => "CAUS004",
            Self::Init001 => "INIT001",
            Self::Init002 => "INIT002",
            Self::Init003 => "INIT003",
            Self::Zen001 => "ZEN001",
            Self::Sdf001 => "SDF001",
            Self::Sdf002 => "SDF002",
            Self::Sdf003 => "SDF003",
            Self::Ct001 => "CT001",
            Self::Ct002 => "CT002",
            Self::Ct003 => "CT003",
            Self::Ct004 => "CT004",
        })
    }
}
