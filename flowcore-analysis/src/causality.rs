//! Causality pass: dependency graph construction, Tarjan SCC detection, cycle
//! admissibility, and the constructive three-valued fixed point.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use flowcore_diagnostics::{DiagCode, DiagnosticSink};
use flowcore_ir::{
    Ir, LatticeHeight, NodeKind, ReactionId, RefTarget, TriValue, Value, WritePolicy,
};

/// Edge `a -> b`: reaction `b` instantaneously depends on reaction `a`.
type DepGraph = HashMap<ReactionId, Vec<ReactionId>>;

fn build_dependency_graph(ir: &Ir) -> DepGraph {
    let mut writers_by_target: HashMap<RefTarget, Vec<ReactionId>> = HashMap::new();
    for (id, reaction) in ir.reactions.iter() {
        for target in reaction.write_targets() {
            writers_by_target.entry(target).or_default().push(id);
        }
    }

    // output port -> input ports it feeds, via explicit edges.
    let mut fed_inputs: HashMap<flowcore_ir::PortId, Vec<flowcore_ir::PortId>> = HashMap::new();
    for edge in &ir.edges {
        fed_inputs.entry(edge.from).or_default().push(edge.to);
    }

    let mut graph: DepGraph = ir.reactions.keys().map(|id| (id, Vec::new())).collect();

    for (reader_id, reader) in ir.reactions.iter() {
        let mut writer_candidates: Vec<ReactionId> = Vec::new();
        for read in &reader.reads {
            if let Some(direct) = writers_by_target.get(read) {
                writer_candidates.extend(direct.iter().copied());
            }
            if let RefTarget::Port(input_port) = read {
                // Reads of an output port fed into this input via an explicit edge.
                for (output_port, inputs) in &fed_inputs {
                    if inputs.contains(input_port) {
                        if let Some(via_edge) = writers_by_target.get(&RefTarget::Port(*output_port)) {
                            writer_candidates.extend(via_edge.iter().copied());
                        }
                    }
                }
            }
        }
        for writer_id in writer_candidates {
            let writer = &ir.reactions[writer_id];
            if writer.contract.no_instant_loop {
                continue;
            }
            let entry = graph.entry(writer_id).or_default();
            if !entry.contains(&reader_id) {
                entry.push(reader_id);
            }
        }
    }
    graph
}

/// Iterative Tarjan's algorithm, avoiding recursion depth issues on large,
/// author-controlled graphs.
fn tarjan_scc(graph: &DepGraph) -> Vec<Vec<ReactionId>> {
    struct Frame {
        node: ReactionId,
        child_idx: usize,
    }

    let mut index_counter = 0usize;
    let mut indices: HashMap<ReactionId, usize> = HashMap::new();
    let mut lowlink: HashMap<ReactionId, usize> = HashMap::new();
    let mut on_stack: HashSet<ReactionId> = HashSet::new();
    let mut stack: Vec<ReactionId> = Vec::new();
    let mut sccs: Vec<Vec<ReactionId>> = Vec::new();

    let empty: Vec<ReactionId> = Vec::new();
    let nodes: Vec<ReactionId> = graph.keys().copied().sorted_by_key(|id| format!("{id:?}")).collect();

    for start in nodes {
        if indices.contains_key(&start) {
            continue;
        }
        let mut work: Vec<Frame> = vec![Frame {
            node: start,
            child_idx: 0,
        }];
        indices.insert(start, index_counter);
        lowlink.insert(start, index_counter);
        index_counter += 1;
        stack.push(start);
        on_stack.insert(start);

        while let Some(frame) = work.last_mut() {
            let neighbors = graph.get(&frame.node).unwrap_or(&empty);
            if frame.child_idx < neighbors.len() {
                let next = neighbors[frame.child_idx];
                frame.child_idx += 1;
                if !indices.contains_key(&next) {
                    indices.insert(next, index_counter);
                    lowlink.insert(next, index_counter);
                    index_counter += 1;
                    stack.push(next);
                    on_stack.insert(next);
                    work.push(Frame {
                        node: next,
                        child_idx: 0,
                    });
                } else if on_stack.contains(&next) {
                    let next_index = indices[&next];
                    let cur_low = lowlink[&frame.node];
                    lowlink.insert(frame.node, cur_low.min(next_index));
                }
            } else {
                let node = frame.node;
                work.pop();
                if let Some(parent_frame) = work.last() {
                    let parent = parent_frame.node;
                    let child_low = lowlink[&node];
                    let parent_low = lowlink[&parent];
                    lowlink.insert(parent, parent_low.min(child_low));
                }
                if lowlink[&node] == indices[&node] {
                    let mut component = Vec::new();
                    loop {
                        let member = stack.pop().expect("scc member stack non-empty");
                        on_stack.remove(&member);
                        component.push(member);
                        if member == node {
                            break;
                        }
                    }
                    sccs.push(component);
                }
            }
        }
    }
    sccs
}

fn is_algebraic_cycle(graph: &DepGraph, scc: &[ReactionId]) -> bool {
    if scc.len() >= 2 {
        return true;
    }
    let only = scc[0];
    graph.get(&only).is_some_and(|succ| succ.contains(&only))
}

/// Shared variables written *and* read within the SCC — the ones whose write policy must
/// be monotone with bounded height for the cycle to be constructively eligible.
fn shared_variables_in_scc(ir: &Ir, scc: &HashSet<ReactionId>) -> Vec<flowcore_ir::VariableId> {
    let mut written = HashSet::new();
    let mut read = HashSet::new();
    for &rid in scc {
        let reaction = &ir.reactions[rid];
        for target in reaction.write_targets() {
            if let RefTarget::Variable(v) = target {
                written.insert(v);
            }
        }
        for target in &reaction.reads {
            if let RefTarget::Variable(v) = target {
                read.insert(*v);
            }
        }
    }
    written.intersection(&read).copied().collect()
}

/// Placeholder value used only to let the three-valued evaluator run to a `Present(_)`
/// during the abstract feasibility check below; the *value* is never inspected, only
/// whether a reference has left `⊥`.
fn placeholder_for(ty: flowcore_ir::ElementType) -> Value {
    match ty {
        flowcore_ir::ElementType::Int => Value::Int(0),
        flowcore_ir::ElementType::Float => Value::Float(0.0),
        flowcore_ir::ElementType::Bool => Value::Bool(false),
        flowcore_ir::ElementType::Str => Value::Str(String::new()),
    }
}

struct AbstractEnv<'a> {
    ir: &'a Ir,
    state: HashMap<RefTarget, TriValue>,
}

impl flowcore_ir::eval::TriEnv for AbstractEnv<'_> {
    fn lookup(&self, target: RefTarget) -> TriValue {
        self.state.get(&target).cloned().unwrap_or_else(|| {
            // Not written by anyone in or out of the SCC we tracked explicitly: treat as
            // externally decided (e.g. a port default) with a placeholder value.
            let ty = self.ir.element_type_of(target).unwrap_or(flowcore_ir::ElementType::Int);
            TriValue::Present(placeholder_for(ty))
        })
    }
}

/// Attempt the constructive fixed point for one eligible SCC. Returns `Ok(())` on success,
/// `Err(iterations_attempted)` if the budget was exceeded without every SCC-internal
/// reference reaching `{Absent, Present}`.
fn constructive_fixed_point(ir: &Ir, scc: &[ReactionId], budget: u64) -> Result<(), u64> {
    let members: HashSet<ReactionId> = scc.iter().copied().collect();
    let mut env = AbstractEnv {
        ir,
        state: HashMap::new(),
    };
    // Every target some SCC member writes starts at Bottom; everything else resolves via
    // the environment's externally-decided fallback.
    let mut internal_targets: HashSet<RefTarget> = HashSet::new();
    for &rid in scc {
        for target in ir.reactions[rid].write_targets() {
            internal_targets.insert(target);
            env.state.insert(target, TriValue::Bottom);
        }
    }

    let mut iterations = 0u64;
    loop {
        if iterations > budget {
            return Err(iterations);
        }
        let mut changed = false;
        for &rid in &members {
            let reaction = &ir.reactions[rid];
            for (target, expr) in &reaction.outputs {
                let new_val = flowcore_ir::eval::eval_three_valued(expr, &env, &ir.builtins);
                let slot = env.state.entry(*target).or_insert(TriValue::Bottom);
                if slot.is_bottom() && !new_val.is_bottom() {
                    *slot = new_val;
                    changed = true;
                }
            }
        }
        let all_decided = internal_targets
            .iter()
            .all(|t| !env.state.get(t).is_some_and(TriValue::is_bottom));
        if all_decided {
            return Ok(());
        }
        if !changed {
            return Err(iterations);
        }
        iterations += 1;
    }
}

/// Runs the causality pass. Returns `true` if downstream passes may proceed.
///
/// Records every admitted algebraic cycle onto `ir.scc_groups` as it clears each
/// eligibility check, so the scheduler can scope its microstep budget to the
/// actual cycle rather than the whole tick.
pub fn run(ir: &mut Ir, sink: &mut DiagnosticSink) -> bool {
    let span = tracing::debug_span!("causality_pass");
    let _enter = span.enter();
    let before = sink.len();

    let graph = build_dependency_graph(ir);
    let sccs = tarjan_scc(&graph);
    let mut admitted: Vec<flowcore_ir::SccGroup> = Vec::new();

    for scc in &sccs {
        if !is_algebraic_cycle(&graph, scc) {
            continue;
        }
        let members: HashSet<ReactionId> = scc.iter().copied().collect();
        let member_refs: Vec<_> = scc.iter().map(|r| ir.reaction_ref(*r)).collect();

        let has_raw = scc.iter().any(|r| ir.nodes[ir.reactions[*r].owner].kind == NodeKind::Raw);
        if has_raw {
            sink.emit(
                DiagCode::Caus001,
                "algebraic cycle includes a non-Core (Raw) node".to_string(),
            )
            .with_refs(member_refs);
            continue;
        }
        let has_non_monotone_ext = scc.iter().any(|r| {
            let node = &ir.nodes[ir.reactions[*r].owner];
            node.kind == NodeKind::Ext && !node.contract.monotone
        });
        if has_non_monotone_ext {
            sink.emit(
                DiagCode::Caus002,
                "algebraic cycle includes an Ext node without contract.monotone".to_string(),
            )
            .with_refs(member_refs)
            .with_fix_hint("declare monotone=true on the Ext node's contract");
            continue;
        }

        let shared_vars = shared_variables_in_scc(ir, &members);
        let mut total_height: u64 = 0;
        let mut eligible = true;
        for var_id in &shared_vars {
            let policy = &ir.variables[*var_id].policy;
            if !policy.is_monotone() {
                eligible = false;
                break;
            }
            match policy.lattice_height() {
                Some(LatticeHeight::Bounded(h)) => total_height += u64::from(h),
                _ => {
                    eligible = false;
                    break;
                }
            }
        }
        if !eligible {
            sink.emit(
                DiagCode::Caus004,
                "algebraic cycle is not eligible for constructive evaluation: a shared variable lacks a monotone, bounded-height write policy".to_string(),
            )
            .with_refs(member_refs)
            .with_fix_hint("use a monoidal write policy with a declared bounded height for every shared variable in the cycle");
            continue;
        }

        match constructive_fixed_point(ir, scc, total_height.max(scc.len() as u64)) {
            Ok(()) => {
                tracing::debug!(scc_size = scc.len(), "constructive fixed point reached");
                admitted.push(flowcore_ir::SccGroup { members: scc.clone() });
            }
            Err(iterations) => {
                sink.emit(
                    DiagCode::Caus003,
                    format!("algebraic cycle did not reach a constructive fixed point within {iterations} iterations"),
                )
                .with_refs(member_refs);
            }
        }
    }

    ir.scc_groups = admitted;

    check_non_zeno_rank(ir, &graph, sink);

    !sink.diagnostics()[before..].iter().any(|d| d.is_error())
}

/// Non-Zeno rank check: every reaction whose reads and writes intersect on the
/// same signal without an intervening delay (i.e. it is part of an algebraic self-loop or
/// SCC) must declare a rank and `max_microsteps`.
fn check_non_zeno_rank(ir: &Ir, graph: &DepGraph, sink: &mut DiagnosticSink) {
    let sccs = tarjan_scc(graph);
    for scc in &sccs {
        if !is_algebraic_cycle(graph, scc) {
            continue;
        }
        for &rid in scc {
            let reaction = &ir.reactions[rid];
            if reaction.rank.is_none() || reaction.max_microsteps.is_none() {
                sink.emit(
                    DiagCode::Zen001,
                    format!(
                        "reaction `{}` participates in an algebraic cycle but declares no rank/max_microsteps",
                        reaction.name
                    ),
                )
                .with_ref(ir.reaction_ref(rid))
                .with_fix_hint("declare @rank=<well-founded expr>, max_microsteps=<k>");
            }
        }
    }
}
