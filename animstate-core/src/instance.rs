//! State machine instances.
//!
//! A [`StateMachine`] is a cursor over a shared [`StateGraph`]. Its current
//! state only changes through [`StateMachine::fire_trigger`].

use crate::definition::StateGraph;
use crate::error::CoreError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Shared handle to an instance, as registered with a [`crate::Runner`].
pub type SharedMachine = Arc<Mutex<StateMachine>>;

/// A completed transition, as reported to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    pub from_state: String,
    pub trigger: String,
    pub to_state: String,
}

/// Receives a callback after every successful trigger.
pub trait TransitionObserver: Send + Sync {
    fn on_transition(&self, machine: &StateMachine, event: &TransitionEvent);
}

impl<F> TransitionObserver for F
where
    F: Fn(&StateMachine, &TransitionEvent) + Send + Sync,
{
    fn on_transition(&self, machine: &StateMachine, event: &TransitionEvent) {
        self(machine, event)
    }
}

/// A live state machine bound to one graph.
pub struct StateMachine {
    id: Uuid,
    graph: Arc<StateGraph>,
    current: String,
    time_in_state: f32,
    observer: Option<Arc<dyn TransitionObserver>>,
}

impl StateMachine {
    /// Creates an instance starting in `initial_state`.
    pub fn new(graph: Arc<StateGraph>, initial_state: &str) -> Result<Self, CoreError> {
        if !graph.has_state(initial_state) {
            return Err(CoreError::UnknownState {
                state: initial_state.to_string(),
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            graph,
            current: initial_state.to_string(),
            time_in_state: 0.0,
            observer: None,
        })
    }

    /// Creates an instance starting in the graph's default state.
    pub fn with_default_state(graph: Arc<StateGraph>) -> Result<Self, CoreError> {
        let initial = graph
            .default_state()
            .map(str::to_string)
            .ok_or(CoreError::NoInitialState)?;
        Self::new(graph, &initial)
    }

    /// Wraps the instance in a handle a runner can hold.
    pub fn into_shared(self) -> SharedMachine {
        Arc::new(Mutex::new(self))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn graph(&self) -> &Arc<StateGraph> {
        &self.graph
    }

    pub fn current_state_name(&self) -> &str {
        &self.current
    }

    /// Seconds accumulated by [`advance`](Self::advance) since the last transition.
    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Sets the observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Arc<dyn TransitionObserver>) {
        self.observer = Some(observer);
    }

    pub fn observer(&self) -> Option<&Arc<dyn TransitionObserver>> {
        self.observer.as_ref()
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Returns true if the current state accepts `trigger`.
    pub fn can_fire(&self, trigger: &str) -> bool {
        self.graph.can_transition(&self.current, trigger)
    }

    /// Fires a trigger.
    ///
    /// Returns false without side effects if the current state has no
    /// transition for it. On success the state moves first and the observer
    /// is then notified synchronously.
    pub fn fire_trigger(&mut self, trigger: &str) -> bool {
        let Some(to_state) = self
            .graph
            .state(&self.current)
            .and_then(|s| s.transition(trigger))
            .map(|t| t.to.clone())
        else {
            tracing::debug!(
                "instance {}: trigger '{}' not accepted in '{}'",
                self.id,
                trigger,
                self.current
            );
            return false;
        };

        // add_transition and the loaders both reject unknown destinations.
        if !self.graph.has_state(&to_state) {
            tracing::error!(
                "instance {}: trigger '{}' targets missing state '{}'",
                self.id,
                trigger,
                to_state
            );
            return false;
        }

        let from_state = std::mem::replace(&mut self.current, to_state);
        self.time_in_state = 0.0;

        tracing::debug!(
            "instance {}: '{}' --{}--> '{}'",
            self.id,
            from_state,
            trigger,
            self.current
        );

        if let Some(observer) = self.observer.clone() {
            let event = TransitionEvent {
                from_state,
                trigger: trigger.to_string(),
                to_state: self.current.clone(),
            };
            observer.on_transition(self, &event);
        }

        true
    }

    /// Per-frame hook.
    ///
    /// Only tracks time spent in the current state; exit-time transitions
    /// are not evaluated here.
    pub fn advance(&mut self, delta_time: f32) {
        self.time_in_state += delta_time;
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("time_in_state", &self.time_in_state)
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}
