//! Per-run tick metrics, modeled on `dfir_rs::scheduled::metrics::DfirMetrics`'s plain
//! counter-struct shape — a cheap, always-on alternative to a full metrics backend.

#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    pub ticks_completed: u64,
    pub total_microsteps: u64,
    pub max_microsteps_in_a_tick: u32,
    pub scc_loop_invocations: u64,
}

impl TickMetrics {
    pub fn record_tick(&mut self, microsteps: u32) {
        self.ticks_completed += 1;
        self.total_microsteps += u64::from(microsteps);
        self.max_microsteps_in_a_tick = self.max_microsteps_in_a_tick.max(microsteps);
    }
}
