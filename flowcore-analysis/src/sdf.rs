//! Synchronous dataflow rate-balancing pass.
//!
//! Builds the topology matrix Γ over every node pair connected by an edge whose endpoints
//! both declare a `rate`, solves for the minimal positive integer firing vector `q` with
//! `Γ·q = 0`, and rejects (`SDF001`) components with no consistent solution. `SDF002`
//! additionally rejects a rated component that overlaps an algebraic cycle among its own
//! reactions — running both scheduling disciplines over the same nodes has no single
//! well-defined schedule.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use flowcore_diagnostics::{DiagCode, DiagnosticSink};
use flowcore_ir::{Ir, NodeId, ReactionId, RefTarget};

/// A reduced rational, kept in lowest terms with a positive denominator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Rational {
    num: i64,
    den: i64,
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    if a == 0 {
        1
    } else {
        a
    }
}

impl Rational {
    fn new(num: i64, den: i64) -> Self {
        let sign = if den < 0 { -1 } else { 1 };
        let (num, den) = (num * sign, den * sign);
        let g = gcd(num, den);
        Self {
            num: num / g,
            den: den / g,
        }
    }

    fn mul_ratio(self, produce: u32, consume: u32) -> Self {
        Rational::new(self.num * i64::from(produce), self.den * i64::from(consume))
    }
}

fn lcm(a: i64, b: i64) -> i64 {
    a / gcd(a, b) * b
}

struct RatedEdge {
    from_node: NodeId,
    to_node: NodeId,
    produce: u32,
    consume: u32,
}

fn rated_edges(ir: &Ir) -> Vec<RatedEdge> {
    let mut out = Vec::new();
    for edge in &ir.edges {
        let (Some(from), Some(to)) = (ir.ports.get(edge.from), ir.ports.get(edge.to)) else {
            continue;
        };
        let (Some(produce), Some(consume)) = (from.rate, to.rate) else {
            continue;
        };
        out.push(RatedEdge {
            from_node: from.owner,
            to_node: to.owner,
            produce,
            consume,
        });
    }
    out
}

fn connected_components(nodes: &HashSet<NodeId>, edges: &[RatedEdge]) -> Vec<HashSet<NodeId>> {
    let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in edges {
        adjacency.entry(edge.from_node).or_default().push(edge.to_node);
        adjacency.entry(edge.to_node).or_default().push(edge.from_node);
    }
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut components = Vec::new();
    let sorted: Vec<NodeId> = nodes.iter().copied().sorted_by_key(|n| format!("{n:?}")).collect();
    for &start in &sorted {
        if visited.contains(&start) {
            continue;
        }
        let mut component = HashSet::new();
        let mut stack = vec![start];
        visited.insert(start);
        while let Some(n) = stack.pop() {
            component.insert(n);
            if let Some(neighbors) = adjacency.get(&n) {
                for &next in neighbors {
                    if visited.insert(next) {
                        stack.push(next);
                    }
                }
            }
        }
        components.push(component);
    }
    components
}

/// Solves `Γ·q = 0` for one connected component by BFS-propagating the rational firing
/// ratio from an arbitrary root, then scaling to the minimal positive integer vector.
/// Returns `None` if the component's edges are inconsistent (no single `q` satisfies
/// every edge, e.g. a rate-mismatched cycle).
fn solve_component(component: &HashSet<NodeId>, edges: &[RatedEdge]) -> Option<HashMap<NodeId, u64>> {
    let mut ratios: HashMap<NodeId, Rational> = HashMap::new();
    let mut adjacency: HashMap<NodeId, Vec<(NodeId, u32, u32, bool)>> = HashMap::new();
    for edge in edges {
        if !component.contains(&edge.from_node) {
            continue;
        }
        // forward: to_node ratio = from_node ratio * produce/consume
        adjacency
            .entry(edge.from_node)
            .or_default()
            .push((edge.to_node, edge.produce, edge.consume, true));
        adjacency
            .entry(edge.to_node)
            .or_default()
            .push((edge.from_node, edge.produce, edge.consume, false));
    }

    let sorted: Vec<NodeId> = component.iter().copied().sorted_by_key(|n| format!("{n:?}")).collect();
    let root = *sorted.first()?;
    ratios.insert(root, Rational::new(1, 1));
    let mut stack = vec![root];
    while let Some(n) = stack.pop() {
        let current = ratios[&n];
        if let Some(neighbors) = adjacency.get(&n) {
            for &(next, produce, consume, forward) in neighbors {
                let expected = if forward {
                    current.mul_ratio(produce, consume)
                } else {
                    current.mul_ratio(consume, produce)
                };
                match ratios.get(&next) {
                    Some(existing) if *existing != expected => return None,
                    Some(_) => continue,
                    None => {
                        ratios.insert(next, expected);
                        stack.push(next);
                    }
                }
            }
        }
    }

    if ratios.len() != component.len() {
        return None;
    }

    let den_lcm = ratios.values().fold(1i64, |acc, r| lcm(acc, r.den));
    let scaled: HashMap<NodeId, i64> = ratios.iter().map(|(n, r)| (*n, r.num * (den_lcm / r.den))).collect();
    if scaled.values().any(|&v| v <= 0) {
        return None;
    }
    let overall_gcd = scaled.values().copied().fold(0i64, gcd);
    Some(scaled.into_iter().map(|(n, v)| (n, (v / overall_gcd) as u64)).collect())
}

/// Conservative check for `SDF002`: does this rated component contain an algebraic cycle
/// among its own reactions? Mirrors [`crate::causality::run`]'s instantaneous-edge
/// construction, scoped to the component, since an SDF schedule and a microstep loop
/// cannot both own the same nodes' execution order.
fn component_has_reaction_cycle(ir: &Ir, component: &HashSet<NodeId>) -> bool {
    let reactions: Vec<ReactionId> = component
        .iter()
        .flat_map(|n| ir.nodes[*n].reactions.iter().copied())
        .collect();
    let reaction_set: HashSet<ReactionId> = reactions.iter().copied().collect();

    let mut writers_by_target: HashMap<RefTarget, Vec<ReactionId>> = HashMap::new();
    for &rid in &reactions {
        for target in ir.reactions[rid].write_targets() {
            writers_by_target.entry(target).or_default().push(rid);
        }
    }
    let mut adjacency: HashMap<ReactionId, Vec<ReactionId>> = HashMap::new();
    for &rid in &reactions {
        for read in &ir.reactions[rid].reads {
            if let Some(writers) = writers_by_target.get(read) {
                for &w in writers {
                    adjacency.entry(w).or_default().push(rid);
                }
            }
        }
    }

    let mut visiting: HashSet<ReactionId> = HashSet::new();
    let mut done: HashSet<ReactionId> = HashSet::new();
    fn dfs(
        node: ReactionId,
        adjacency: &HashMap<ReactionId, Vec<ReactionId>>,
        visiting: &mut HashSet<ReactionId>,
        done: &mut HashSet<ReactionId>,
    ) -> bool {
        if done.contains(&node) {
            return false;
        }
        if !visiting.insert(node) {
            return true;
        }
        if let Some(next) = adjacency.get(&node) {
            for &n in next {
                if dfs(n, adjacency, visiting, done) {
                    return true;
                }
            }
        }
        visiting.remove(&node);
        done.insert(node);
        false
    }
    for &rid in &reaction_set {
        if dfs(rid, &adjacency, &mut visiting, &mut done) {
            return true;
        }
    }
    false
}

/// A firing vector whose largest entry exceeds this is treated as requiring unbounded
/// buffering under any admissible schedule: the solved ratios are exact, but a schedule
/// that needs this many firings of one actor per macro-period before the others is not
/// something any host is expected to buffer for. Conservative, not derived from a
/// specific memory budget.
const MAX_BOUNDED_FIRINGS: u64 = 4096;

/// Runs `SDF001`/`SDF002`/`SDF003`. Returns `true` if downstream passes may proceed.
///
/// For every rated component with a consistent, boundedly-sized firing vector, records a
/// [`flowcore_ir::SdfSchedule`] onto `ir.sdf_schedules` so the scheduler can drive that
/// component by the static schedule instead of generic dirty propagation.
pub fn run(ir: &mut Ir, sink: &mut DiagnosticSink) -> bool {
    let span = tracing::debug_span!("sdf_pass");
    let _enter = span.enter();
    let before = sink.len();

    let edges = rated_edges(ir);
    if edges.is_empty() {
        return true;
    }
    let rated_nodes: HashSet<NodeId> = edges.iter().flat_map(|e| [e.from_node, e.to_node]).collect();
    let components = connected_components(&rated_nodes, &edges);
    let mut schedules = Vec::new();

    for component in &components {
        if component.len() < 2 {
            continue;
        }
        match solve_component(component, &edges) {
            None => {
                sink.emit(
                    DiagCode::Sdf001,
                    "no minimal positive integer firing vector satisfies this rated subgraph's rates".to_string(),
                )
                .with_refs(component.iter().map(|n| ir.node_ref(*n)));
            }
            Some(firing_vector) => {
                if component_has_reaction_cycle(ir, component) {
                    sink.emit(
                        DiagCode::Sdf002,
                        "rated subgraph overlaps an algebraic cycle among its own reactions".to_string(),
                    )
                    .with_refs(component.iter().map(|n| ir.node_ref(*n)))
                    .with_fix_hint("keep SDF-scheduled and cyclically-coupled reactions in disjoint nodes");
                    continue;
                }
                let max_firings = firing_vector.values().copied().max().unwrap_or(0);
                if max_firings > MAX_BOUNDED_FIRINGS {
                    sink.emit(
                        DiagCode::Sdf003,
                        format!(
                            "rated subgraph's minimal firing vector requires {max_firings} firings of one actor per macro-period, which this core will not buffer for; falling back to event-driven scheduling"
                        ),
                    )
                    .with_refs(component.iter().map(|n| ir.node_ref(*n)))
                    .with_fix_hint("rebalance port rates so the minimal firing vector stays bounded, or split the subgraph");
                    continue;
                }
                schedules.push(flowcore_ir::SdfSchedule { firings: firing_vector });
            }
        }
    }

    ir.sdf_schedules = schedules;

    !sink.diagnostics()[before..].iter().any(|d| d.is_error())
}
