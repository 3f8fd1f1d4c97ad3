//! Runner - ticks a set of live instances once per host frame.

use crate::instance::SharedMachine;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Identity of a shared handle: the address of its allocation.
///
/// Reading it never takes the instance lock, so observers running inside
/// `fire_trigger` can start or stop their own instance.
fn handle_key(machine: &SharedMachine) -> usize {
    Arc::as_ptr(machine) as usize
}

/// Owns the live set of instances and advances them on each host pulse.
///
/// The host calls [`attach`](Runner::attach) when it starts delivering
/// frames, [`tick`](Runner::tick) exactly once per frame, and
/// [`detach`](Runner::detach) when it stops.
pub struct Runner {
    /// Live instances indexed by handle.
    instances: DashMap<usize, SharedMachine>,

    attached: AtomicBool,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            instances: DashMap::new(),
            attached: AtomicBool::new(false),
        }
    }

    /// Adds an instance to the live set. Starting it again has no effect.
    pub fn start(&self, machine: SharedMachine) {
        let key = handle_key(&machine);
        if self.instances.insert(key, machine).is_none() {
            tracing::debug!("runner: started instance {:#x}", key);
        }
    }

    /// Removes an instance from the live set, if present.
    pub fn stop(&self, machine: &SharedMachine) -> bool {
        let key = handle_key(machine);
        let removed = self.instances.remove(&key).is_some();
        if removed {
            tracing::debug!("runner: stopped instance {:#x}", key);
        }
        removed
    }

    pub fn is_running(&self, machine: &SharedMachine) -> bool {
        self.instances.contains_key(&handle_key(machine))
    }

    /// Returns the number of live instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Advances every live instance once.
    ///
    /// The live set is captured before any instance runs, so instances
    /// started or stopped during the tick take effect on the next one.
    /// Ticks delivered while detached are ignored.
    pub fn tick(&self, delta_time: f32) -> usize {
        if !self.is_attached() {
            tracing::warn!("runner: tick while detached ignored");
            return 0;
        }

        let live: Vec<SharedMachine> = self.instances.iter().map(|r| r.value().clone()).collect();
        for machine in &live {
            machine.lock().advance(delta_time);
        }

        tracing::trace!("runner: ticked {} instances (dt={})", live.len(), delta_time);
        live.len()
    }

    /// Marks the runner as receiving host frames.
    pub fn attach(&self) {
        if self.attached.swap(true, Ordering::AcqRel) {
            tracing::warn!("runner: already attached");
        } else {
            tracing::debug!("runner: attached");
        }
    }

    /// Marks the runner as no longer receiving host frames.
    pub fn detach(&self) {
        if self.attached.swap(false, Ordering::AcqRel) {
            tracing::debug!("runner: detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a shared runner.
pub fn create_runner() -> Arc<Runner> {
    Arc::new(Runner::new())
}
