//! The three-phase deterministic tick scheduler: propose, resolve, commit,
//! repeated as successive microsteps within one tick until the environment is quiescent.
//! A microstep is just this triad applied once; an ordinary acyclic dataflow chain
//! naturally quiesces after as many microsteps as the chain is deep and is never budget-limited,
//! since the causality pass already proved it acyclic. Each admitted algebraic cycle
//! (`ir.scc_groups`) carries its own scoped microstep counter, bounded by the tightest
//! `max_microsteps` its own members declare; exceeding it raises [`crate::error::ZenoRuntimeError::MicrostepBudgetExceeded`]
//! naming that cycle's members, never the whole tick.
//!
//! Only the first microstep proposes every reaction unconditionally; every later
//! microstep only re-proposes a reaction whose `reads` actually overlap with whatever
//! changed last microstep. A reaction with no reads (a pure constant emitter) therefore
//! only ever fires once per tick, and a feed-forward reaction only re-fires while its
//! inputs are still rippling in. This also fixes monoidal write-policy resolution: each
//! microstep resolves a Monoid variable's proposals against the value committed at the
//! *start of the tick*, not the growing value from the previous microstep, so a set of
//! writers whose proposals stop changing converges instead of re-folding itself forever.
//!
//! Nodes covered by a static SDF schedule (`ir.sdf_schedules`) are driven separately,
//! before this loop starts: [`Scheduler::run_sdf_schedules`] replays their solved firing
//! sequence directly rather than relying on dirty propagation to discover the right order.

use std::collections::{HashMap, HashSet};

use flowcore_ir::eval::eval_concrete;
use flowcore_ir::{Ir, NodeId, PortId, ReactionId, RefTarget, Value, VariableId};

use crate::env::{Env, EnvView};
use crate::error::{EventTagError, RuntimeError, ZenoRuntimeError};
use crate::metrics::TickMetrics;
use crate::resolve::resolve_variable;
use crate::tag::Tag;

/// Fallback budget for an admitted SCC that somehow declares no `max_microsteps` of its
/// own. The non-Zeno check (`flowcore-analysis::causality::check_non_zeno_rank`) rejects
/// such a cycle at compile time (`ZEN001`), so this never actually applies to a graph that
/// reaches the scheduler; it exists so resolving a budget can't panic.
const DEFAULT_MICROSTEP_BUDGET: u32 = 64;

/// Absolute backstop on tick length when no admitted SCC is active. A causality-accepted
/// graph's acyclic portion is bounded by its reaction count, which is always far below
/// this; reaching it indicates a bug elsewhere in the scheduler, not a slow user graph.
const SAFETY_MICROSTEP_BOUND: u32 = 100_000;

/// One admitted algebraic cycle's scoped microstep budget: the tightest `max_microsteps`
/// declared among its own members, per spec. The scheduler's dirty-propagation loop
/// tracks a separate counter per entry here instead of one counter for the whole tick.
struct SccBudget {
    members: Vec<ReactionId>,
    budget: u32,
}

/// An external write queued via [`Scheduler::events_in`], applied as an extra proposal
/// alongside ordinary reactions at the start of the tick it targets. Grounded on `dfir_rs::scheduled::reactor::Reactor`'s role as the
/// external-to-internal event gateway.
struct PendingEvent {
    tag: Tag,
    target: RefTarget,
    value: Value,
}

/// Returned by [`Scheduler::snapshot`]: the committed state of every port and variable as
/// of a given tag. Hidden delay states are deliberately excluded — they are an
/// implementation artifact of `Delay` lowering, not part of the graph a host authored.
#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    pub tag: Tag,
    pub ports: HashMap<PortId, Option<Value>>,
    pub variables: HashMap<VariableId, Option<Value>>,
}

pub struct Scheduler {
    ir: Ir,
    env: Env,
    current_tag: Tag,
    metrics: TickMetrics,
    pending_events: Vec<PendingEvent>,
    scc_budgets: Vec<SccBudget>,
    /// Reactions owned by a node driven by a static SDF schedule — excluded from the
    /// generic dirty-propagation loop since `run_sdf_schedules` already fired them their
    /// declared number of times this tick.
    sdf_reactions: HashSet<ReactionId>,
}

impl Scheduler {
    pub fn new(ir: Ir) -> Self {
        let env = Env::seeded(&ir);
        let scc_budgets = ir
            .scc_groups
            .iter()
            .map(|group| {
                let budget = group
                    .members
                    .iter()
                    .filter_map(|r| ir.reactions.get(*r).and_then(|reaction| reaction.max_microsteps))
                    .min()
                    .unwrap_or(DEFAULT_MICROSTEP_BUDGET);
                SccBudget {
                    members: group.members.clone(),
                    budget,
                }
            })
            .collect();
        let sdf_nodes: HashSet<NodeId> = ir.sdf_schedules.iter().flat_map(|s| s.firings.keys().copied()).collect();
        let sdf_reactions: HashSet<ReactionId> = ir
            .nodes
            .iter()
            .filter(|(id, _)| sdf_nodes.contains(id))
            .flat_map(|(_, node)| node.reactions.iter().copied())
            .collect();
        Self {
            ir,
            env,
            current_tag: Tag::ZERO,
            metrics: TickMetrics::default(),
            pending_events: Vec::new(),
            scc_budgets,
            sdf_reactions,
        }
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    pub fn current_tag(&self) -> Tag {
        self.current_tag
    }

    /// Read a port or variable's current committed value (`None` is `ABSENT`).
    pub fn read(&self, target: RefTarget) -> Option<Value> {
        self.env.get(target)
    }

    /// A snapshot of every port and variable's committed value as of the current tag,
    /// for observability.
    pub fn snapshot(&self) -> EnvSnapshot {
        EnvSnapshot {
            tag: self.current_tag,
            ports: self.env.ports.clone(),
            variables: self.env.variables.clone(),
        }
    }

    /// Queue an external write for a future tag. Rejected if `tag` is not strictly after
    /// the scheduler's current tag.
    pub fn events_in(&mut self, tag: Tag, target: RefTarget, value: Value) -> Result<(), EventTagError> {
        if tag <= self.current_tag {
            return Err(EventTagError::PastTag {
                given: tag,
                current: self.current_tag,
            });
        }
        self.pending_events.push(PendingEvent { tag, target, value });
        Ok(())
    }

    /// Runs `ticks` ticks, each advancing superdense time by one `t`. `dt`, when
    /// given, is handed to every `ContinuousWrapper` node's `dt` input each tick;
    /// omit it for a purely discrete-event run.
    pub fn run(&mut self, ticks: u64, dt: Option<f64>) -> Result<(), RuntimeError> {
        for _ in 0..ticks {
            self.step(dt)?;
        }
        Ok(())
    }

    /// Runs exactly one tick, returning a snapshot of the committed environment once the
    /// tick quiesces, for observability.
    pub fn step(&mut self, dt: Option<f64>) -> Result<EnvSnapshot, RuntimeError> {
        let tick_tag = self.current_tag.next_tick();
        let span = tracing::debug_span!("tick", t = tick_tag.t);
        let _enter = span.enter();
        self.env.start_tick(&self.ir);
        if let Some(dt) = dt {
            self.feed_continuous_dt(dt);
        }
        self.apply_due_events(tick_tag);
        self.run_sdf_schedules()?;

        // Resolved once per tick: every Monoid variable's proposals fold onto this value,
        // never onto what the tick itself has committed so far.
        let tick_start_variables = self.env.variables.clone();

        let mut microstep: u32 = 0;
        let mut dirty: Option<HashSet<RefTarget>> = None;
        let mut scc_counters: Vec<u32> = vec![0; self.scc_budgets.len()];
        loop {
            let (changed, fired) = self.propose_resolve_commit(&tick_start_variables, dirty.as_ref())?;
            if changed.is_empty() {
                break;
            }
            dirty = Some(changed);
            microstep += 1;

            let mut any_scc_active = false;
            for (idx, scc) in self.scc_budgets.iter().enumerate() {
                if scc.members.iter().any(|r| fired.contains(r)) {
                    any_scc_active = true;
                    scc_counters[idx] += 1;
                    if scc_counters[idx] > scc.budget {
                        return Err(ZenoRuntimeError::MicrostepBudgetExceeded {
                            tick: tick_tag.t,
                            budget: scc.budget,
                            scc_members: scc.members.clone(),
                        }
                        .into());
                    }
                }
            }
            if !any_scc_active && microstep > SAFETY_MICROSTEP_BOUND {
                return Err(ZenoRuntimeError::SafetyBoundExceeded {
                    tick: tick_tag.t,
                    budget: SAFETY_MICROSTEP_BOUND,
                }
                .into());
            }
        }

        self.apply_delayed_writes();
        self.metrics.record_tick(microstep);
        if microstep > 0 {
            self.metrics.scc_loop_invocations += 1;
        }
        self.current_tag = tick_tag;
        Ok(self.snapshot())
    }

    /// Every `ContinuousWrapper` node's `dt` input port receives the elapsed step size.
    fn feed_continuous_dt(&mut self, dt: f64) {
        for node in self.ir.nodes.values() {
            if node.kind != flowcore_ir::NodeKind::ContinuousWrapper {
                continue;
            }
            if let Some(port) = node.port_named(&self.ir.ports, "dt") {
                self.env.set(RefTarget::Port(port.id), Some(Value::Float(dt)));
            }
        }
    }

    fn apply_due_events(&mut self, tick_tag: Tag) {
        let (due, later): (Vec<_>, Vec<_>) = self.pending_events.drain(..).partition(|e| e.tag.t <= tick_tag.t);
        self.pending_events = later;
        for event in due {
            self.env.set(event.target, Some(event.value));
        }
    }

    /// One microstep: every reaction eligible this microstep proposes against the env as
    /// of the previous microstep, every target's intents resolve via its write policy
    /// (Monoid variables always against `tick_start_variables`), then commit publishes.
    ///
    /// `dirty` is `None` on a tick's first microstep, when every reaction proposes
    /// unconditionally, and `Some(changed)` afterwards, when a reaction only proposes if
    /// at least one of its `reads` is in `changed` — a reaction with no reads (nothing can
    /// ever change for it) or whose reads are all still stable therefore does not
    /// re-propose. This is what keeps a genuine algebraic cycle looping while every other
    /// reaction fires at most once per target change, which is both the fix for monoidal
    /// resolution re-growing forever and a direct reading of "only a reaction whose inputs
    /// changed needs to run again".
    ///
    /// Returns every target that actually changed this microstep (which becomes next
    /// microstep's `dirty` set; an empty return means the tick has quiesced) alongside
    /// every reaction that actually proposed this microstep — the budget in [`Scheduler::step`]
    /// is scoped to whichever admitted SCC these overlap, not the whole tick.
    ///
    /// Reactions owned by a statically SDF-scheduled node are excluded: `run_sdf_schedules`
    /// already fired them their declared number of times before this loop starts.
    fn propose_resolve_commit(
        &mut self,
        tick_start_variables: &HashMap<VariableId, Option<Value>>,
        dirty: Option<&HashSet<RefTarget>>,
    ) -> Result<(HashSet<RefTarget>, HashSet<ReactionId>), RuntimeError> {
        let view = EnvView(&self.env);
        let mut port_intents: HashMap<RefTarget, Vec<Value>> = HashMap::new();
        let mut variable_intents: HashMap<flowcore_ir::VariableId, Vec<(ReactionId, Value)>> = HashMap::new();
        let mut fired: HashSet<ReactionId> = HashSet::new();

        for (reaction_id, reaction) in self.ir.reactions.iter() {
            if self.sdf_reactions.contains(&reaction_id) {
                continue;
            }
            if let Some(dirty) = dirty {
                let reacts_to_change = !reaction.reads.is_empty() && reaction.reads.iter().any(|r| dirty.contains(r));
                if !reacts_to_change {
                    continue;
                }
            }
            fired.insert(reaction_id);
            for (target, expr) in &reaction.outputs {
                let Some(value) = eval_concrete(expr, &view, &self.ir.builtins) else {
                    continue; // ABSENT: no intent, (a).
                };
                match target {
                    RefTarget::Variable(var_id) => {
                        variable_intents.entry(*var_id).or_default().push((reaction_id, value));
                    }
                    other => {
                        port_intents.entry(*other).or_default().push(value);
                    }
                }
            }
        }
        drop(view);

        let mut changed: HashSet<RefTarget> = HashSet::new();

        for (target, mut values) in port_intents {
            // Ports/States have exactly one static writer by construction (fan-in <= 1,
            // hidden states have a single deferred writer), so the last proposal this
            // microstep is the only one — any ambiguity is a graph-construction bug.
            let value = values.pop();
            if value != self.env.get(target) {
                self.env.set(target, value);
                changed.insert(target);
            }
        }

        for (var_id, proposals) in variable_intents {
            let variable = &self.ir.variables[var_id];
            let existing = tick_start_variables.get(&var_id).and_then(|v| v.as_ref());
            let resolved = resolve_variable(var_id, &variable.policy, existing, &proposals)?;
            if resolved != self.env.variables.get(&var_id).cloned().flatten() {
                self.env.variables.insert(var_id, resolved);
                changed.insert(RefTarget::Variable(var_id));
            }
        }

        changed.extend(self.sync_fed_inputs());

        Ok((changed, fired))
    }

    /// Drives every static SDF schedule's firing sequence for this tick: each scheduled
    /// node's reactions fire, in sequence order, exactly as many times as the SDF pass
    /// solved — committing after every single firing, ahead of the generic
    /// dirty-propagation loop and outside its SCC microstep budgets entirely, since a
    /// rated component was proven disjoint from every algebraic cycle (`SDF002`).
    fn run_sdf_schedules(&mut self) -> Result<(), RuntimeError> {
        let sequences: Vec<Vec<NodeId>> = self.ir.sdf_schedules.iter().map(|s| s.sequence()).collect();
        for sequence in sequences {
            for node_id in sequence {
                let reaction_ids: Vec<ReactionId> = self.ir.nodes[node_id].reactions.iter().copied().collect();
                for reaction_id in reaction_ids {
                    self.fire_reaction_once(reaction_id)?;
                }
            }
        }
        Ok(())
    }

    /// Evaluates one reaction against the currently committed environment and commits its
    /// outputs immediately — the execution primitive a static SDF firing sequence replays.
    /// Unlike the generic microstep loop, a monoidal variable resolves against whatever is
    /// currently committed rather than a tick-start snapshot: each firing is a distinct,
    /// intentional event, not a re-proposal of the same intent converging to a fixed point.
    fn fire_reaction_once(&mut self, reaction_id: ReactionId) -> Result<(), RuntimeError> {
        let view = EnvView(&self.env);
        let reaction = &self.ir.reactions[reaction_id];
        let mut port_writes: Vec<(RefTarget, Value)> = Vec::new();
        let mut variable_writes: Vec<(VariableId, Value)> = Vec::new();
        for (target, expr) in &reaction.outputs {
            let Some(value) = eval_concrete(expr, &view, &self.ir.builtins) else {
                continue;
            };
            match target {
                RefTarget::Variable(var_id) => variable_writes.push((*var_id, value)),
                other => port_writes.push((*other, value)),
            }
        }
        drop(view);

        for (target, value) in port_writes {
            self.env.set(target, Some(value));
        }
        for (var_id, value) in variable_writes {
            let variable = &self.ir.variables[var_id];
            let existing = self.env.variables.get(&var_id).cloned().flatten();
            let resolved = resolve_variable(var_id, &variable.policy, existing.as_ref(), &[(reaction_id, value)])?;
            self.env.variables.insert(var_id, resolved);
        }
        self.sync_fed_inputs();
        Ok(())
    }

    /// Mirrors every output port's just-committed value onto the input ports its edges
    /// feed, and every subscribed variable's value onto the inputs that subscribe to it.
    /// An input whose source is currently `ABSENT` falls back to the input's own declared
    /// default rather than going absent itself. Returns every input port that changed.
    fn sync_fed_inputs(&mut self) -> HashSet<RefTarget> {
        let mut changed = HashSet::new();
        for edge in &self.ir.edges {
            let source = self.env.ports.get(&edge.from).cloned().flatten();
            let to_port = &self.ir.ports[edge.to];
            let new_value = source.or_else(|| to_port.default.clone());
            if self.env.ports.get(&edge.to).cloned().flatten() != new_value {
                self.env.ports.insert(edge.to, new_value);
                changed.insert(RefTarget::Port(edge.to));
            }
        }
        for port in self.ir.ports.values() {
            let Some(variable) = port.variable_subscription else { continue };
            let source = self.env.variables.get(&variable).cloned().flatten();
            let new_value = source.or_else(|| port.default.clone());
            if self.env.ports.get(&port.id).cloned().flatten() != new_value {
                self.env.ports.insert(port.id, new_value);
                changed.insert(RefTarget::Port(port.id));
            }
        }
        changed
    }

    fn apply_delayed_writes(&mut self) {
        let view = EnvView(&self.env);
        let mut writes = Vec::with_capacity(self.ir.delayed_writes.len());
        for dw in &self.ir.delayed_writes {
            let value = eval_concrete(&dw.expr, &view, &self.ir.builtins);
            writes.push((dw.state, value));
        }
        drop(view);
        for (state_id, value) in writes {
            if let Some(v) = value {
                self.env.states.insert(state_id, v);
            }
        }
    }
}
