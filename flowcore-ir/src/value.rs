use std::cmp::Ordering;
use std::fmt;

/// The closed set of element types the core understands directly. Opaque builtins may
/// carry richer payloads, but every port/variable/state in the core is typed as one of
/// these.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ElementType {
    Int,
    Float,
    Bool,
    Str,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Bool => "Bool",
            Self::Str => "Str",
        })
    }
}

/// A concrete runtime value. `ABSENT` is represented separately, never as a
/// `Value` variant, so that "a reader observed `ABSENT`" and "a reader observed a real
/// value" stay statically distinguishable at the evaluator boundary.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Int(_) => ElementType::Int,
            Self::Float(_) => ElementType::Float,
            Self::Bool(_) => ElementType::Bool,
            Self::Str(_) => ElementType::Str,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
        }
    }
}

/// Total-order wrapper for `f64`, used only at the boundary where a monoidal write
/// policy needs an `Ord` type to hand to [`lattices::Max`]/[`lattices::Min`] (`Value`
/// itself stays plain `f64` since ordinary arithmetic never needs a total order).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrderedFloat(pub f64);

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// The three-valued domain used by the constructive analyzer.
///
/// `⊥` never escapes the analyzer: the concrete evaluator ([`crate::eval::eval_concrete`])
/// only ever produces [`TriValue::Absent`] or [`TriValue::Present`].
#[derive(Debug, Clone, PartialEq)]
pub enum TriValue {
    /// Not yet determined during constructive iteration. Analysis-only.
    Bottom,
    /// The legal "no value this tick" sentinel, visible at runtime.
    Absent,
    /// A committed value.
    Present(Value),
}

impl TriValue {
    pub fn is_bottom(&self) -> bool {
        matches!(self, Self::Bottom)
    }

    /// The partial order `⊥ ⊑ Absent` and `⊥ ⊑ Present(v)` used to show the three-valued
    /// evaluator's monotonicity. `Absent` and `Present` are incomparable.
    pub fn leq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bottom, _) => true,
            (a, b) if a == b => true,
            _ => false,
        }
    }
}
