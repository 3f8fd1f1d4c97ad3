//! Frame pulse - the host loop that drives a runner.

use crate::config::{FrameConfig, ScriptedTrigger};
use animstate_core::{Runner, SharedMachine};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Attaches a [`Runner`] and ticks it once per frame until shut down.
pub struct FramePulse {
    runner: Arc<Runner>,
    config: FrameConfig,
    script: Mutex<Vec<(ScriptedTrigger, SharedMachine)>>,
    frames: AtomicU64,
    shutdown: AtomicBool,
    notify: Notify,
}

impl FramePulse {
    /// Creates a new frame pulse.
    pub fn new(runner: Arc<Runner>, config: FrameConfig) -> Self {
        Self {
            runner,
            config,
            script: Mutex::new(Vec::new()),
            frames: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Schedules triggers to fire on `machine` before the matching frame's tick.
    pub fn schedule(&self, script: &[ScriptedTrigger], machine: &SharedMachine) {
        let mut pending = self.script.lock();
        for entry in script {
            pending.push((entry.clone(), machine.clone()));
        }
    }

    /// Runs the frame loop (call from a background task).
    ///
    /// Returns the number of frames delivered.
    pub async fn run(&self) -> u64 {
        let dt = self.config.delta_time();
        let mut interval = tokio::time::interval(self.config.frame_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        self.runner.attach();
        tracing::info!(
            "Frame pulse started (rate_hz={}, max_frames={})",
            self.config.rate_hz,
            self.config.max_frames
        );

        loop {
            tokio::select! {
                _ = self.notify.notified() => {}
                _ = interval.tick() => {}
            }

            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            let frame = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
            self.fire_scripted(frame);
            self.runner.tick(dt);

            if self.config.is_bounded() && frame >= self.config.max_frames {
                break;
            }
        }

        self.runner.detach();
        let frames = self.frames();
        tracing::info!("Frame pulse stopped after {} frames", frames);
        frames
    }

    fn fire_scripted(&self, frame: u64) {
        let due: Vec<(ScriptedTrigger, SharedMachine)> = {
            let mut pending = self.script.lock();
            let (due, rest): (Vec<_>, Vec<_>) =
                pending.drain(..).partition(|(entry, _)| entry.frame <= frame);
            *pending = rest;
            due
        };

        for (entry, machine) in due {
            let mut machine = machine.lock();
            if !machine.fire_trigger(&entry.trigger) {
                tracing::warn!(
                    "frame {}: trigger '{}' not accepted in '{}'",
                    frame,
                    entry.trigger,
                    machine.current_state_name()
                );
            }
        }
    }

    /// Signals the pulse to stop after the current frame.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.notify.notify_one();
    }

    /// Returns the number of frames delivered so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}
