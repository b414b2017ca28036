//! The runnable half of the facade. Wraps
//! [`flowcore_runtime::Scheduler`] and carries the (possibly warning-only) report the
//! compile that produced it emitted, so a host can still inspect non-fatal diagnostics
//! on a pipeline it went ahead and ran.

use flowcore_diagnostics::Report;
use flowcore_ir::{Ir, RefTarget, Value};
use flowcore_runtime::{EnvSnapshot, EventTagError, RuntimeError, Scheduler, Tag, TickMetrics};

pub struct CompiledPipeline {
    scheduler: Scheduler,
    report: Report,
}

impl CompiledPipeline {
    pub(crate) fn new(ir: Ir, report: Report) -> Self {
        Self {
            scheduler: Scheduler::new(ir),
            report,
        }
    }

    /// Diagnostics from the compile that produced this pipeline. Never contains errors —
    /// `Pipeline::compile` would have returned `Err(report)` instead — but may contain
    /// warnings a `pragmatic`/`best_effort` compile chose to demote rather than reject.
    pub fn diagnostics(&self) -> &Report {
        &self.report
    }

    /// Drives the scheduler for `ticks` discrete ticks. `dt`, if given, seeds
    /// every `ContinuousWrapper` node's `dt` input each tick.
    pub fn run(&mut self, ticks: u64, dt: Option<f64>) -> Result<(), RuntimeError> {
        self.scheduler.run(ticks, dt)
    }

    /// Advances a single tick, returning a snapshot of the committed environment for
    /// observability.
    pub fn step(&mut self, dt: Option<f64>) -> Result<EnvSnapshot, RuntimeError> {
        self.scheduler.step(dt)
    }

    /// Enqueues an external event for a future (or current, if still unreached) tag.
    pub fn events_in(&mut self, tag: Tag, target: RefTarget, value: Value) -> Result<(), EventTagError> {
        self.scheduler.events_in(tag, target, value)
    }

    pub fn read(&self, target: RefTarget) -> Option<Value> {
        self.scheduler.read(target)
    }

    pub fn snapshot(&self) -> EnvSnapshot {
        self.scheduler.snapshot()
    }

    pub fn metrics(&self) -> &TickMetrics {
        self.scheduler.metrics()
    }

    pub fn current_tag(&self) -> Tag {
        self.scheduler.current_tag()
    }
}
