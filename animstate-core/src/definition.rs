//! State graph definition types.
//!
//! A [`StateGraph`] owns every [`State`], and each state owns the
//! [`Transition`]s that leave it, keyed by trigger name. Graphs are built
//! either incrementally (`add_state` / `add_transition`) or from JSON, see
//! [`crate::loader`].

use std::collections::HashMap;

/// One condition attached to a transition.
///
/// Conditions are carried as data only. The first condition's parameter
/// names the trigger that fires the transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    /// Parameter name.
    pub parameter: String,
    /// Authoring-tool comparison mode.
    pub mode: i64,
}

impl Condition {
    /// Creates a condition on `parameter` with mode 0.
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            mode: 0,
        }
    }
}

/// A directed edge between two states.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transition {
    /// Trigger name that fires this transition.
    pub trigger: String,

    /// Source state.
    pub from: String,

    /// Destination state.
    pub to: String,

    /// Blend offset into the destination clip.
    pub offset: f32,

    /// Blend duration in seconds.
    pub duration: f32,

    /// Whether the transition waits for `exit_time`.
    pub has_exit_time: bool,

    /// Normalized exit time gate.
    pub exit_time: f32,

    /// Conditions as authored.
    pub conditions: Vec<Condition>,
}

impl Transition {
    /// Creates a transition with zeroed timing, conditioned on its trigger.
    pub fn new(
        trigger: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        let trigger = trigger.into();
        Self {
            conditions: vec![Condition::new(trigger.clone())],
            trigger,
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }

    /// Sets blend offset and duration.
    pub fn with_blend(mut self, offset: f32, duration: f32) -> Self {
        self.offset = offset;
        self.duration = duration;
        self
    }

    /// Gates the transition on an exit time.
    pub fn with_exit_time(mut self, exit_time: f32) -> Self {
        self.has_exit_time = true;
        self.exit_time = exit_time;
        self
    }
}

/// A named node in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    name: String,
    animation_clip: String,
    speed: f32,
    transitions: HashMap<String, Transition>,
}

impl State {
    /// Creates a state with no clip, unit speed and no transitions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            animation_clip: String::new(),
            speed: 1.0,
            transitions: HashMap::new(),
        }
    }

    /// Sets the animation clip and playback speed.
    pub fn with_animation(mut self, clip: impl Into<String>, speed: f32) -> Self {
        self.animation_clip = clip.into();
        self.speed = speed;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn animation_clip(&self) -> &str {
        &self.animation_clip
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Adds a transition keyed by its trigger.
    ///
    /// Returns false and keeps the existing entry if the trigger is taken.
    /// The destination is not checked here.
    pub fn add_transition(&mut self, transition: Transition) -> bool {
        if self.transitions.contains_key(&transition.trigger) {
            tracing::debug!(
                "state '{}' already has a transition for '{}'",
                self.name,
                transition.trigger
            );
            return false;
        }

        self.transitions
            .insert(transition.trigger.clone(), transition);
        true
    }

    /// Returns true if `trigger` leads somewhere from this state.
    pub fn can_transition(&self, trigger: &str) -> bool {
        self.transitions.contains_key(trigger)
    }

    /// Looks up the transition for a trigger.
    pub fn transition(&self, trigger: &str) -> Option<&Transition> {
        self.transitions.get(trigger)
    }

    /// Iterates over outgoing transitions in no particular order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.values()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

/// The full set of named states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateGraph {
    states: HashMap<String, State>,
    default_state: Option<String>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty state.
    ///
    /// Returns false if the name is taken.
    pub fn add_state(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.states.contains_key(&name) {
            tracing::debug!("state '{}' already exists", name);
            return false;
        }

        self.states.insert(name.clone(), State::new(name));
        true
    }

    /// Sets the clip and speed of an existing state.
    pub fn set_animation(&mut self, state: &str, clip: impl Into<String>, speed: f32) -> bool {
        match self.states.get_mut(state) {
            Some(s) => {
                s.animation_clip = clip.into();
                s.speed = speed;
                true
            }
            None => false,
        }
    }

    /// Adds a transition between two existing states.
    ///
    /// Returns false if either endpoint is unknown or the source state
    /// already has a transition for the trigger.
    pub fn add_transition(&mut self, transition: Transition) -> bool {
        if !self.states.contains_key(&transition.to) {
            tracing::debug!(
                "rejecting transition '{}': unknown destination '{}'",
                transition.trigger,
                transition.to
            );
            return false;
        }

        match self.states.get_mut(&transition.from) {
            Some(state) => state.add_transition(transition),
            None => {
                tracing::debug!(
                    "rejecting transition '{}': unknown source '{}'",
                    transition.trigger,
                    transition.from
                );
                false
            }
        }
    }

    /// Returns true if `state` exists and has a transition for `trigger`.
    pub fn can_transition(&self, state: &str, trigger: &str) -> bool {
        self.states
            .get(state)
            .map(|s| s.can_transition(trigger))
            .unwrap_or(false)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    /// Iterates over all states in no particular order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    /// Returns the triggers accepted by a state, sorted.
    pub fn triggers_from(&self, state: &str) -> Vec<&str> {
        let mut triggers: Vec<&str> = self
            .states
            .get(state)
            .map(|s| s.transitions.keys().map(String::as_str).collect())
            .unwrap_or_default();
        triggers.sort_unstable();
        triggers
    }

    /// State new instances start in when none is given.
    pub fn default_state(&self) -> Option<&str> {
        self.default_state.as_deref()
    }

    /// Sets the default state. Returns false if the state is unknown.
    pub fn set_default_state(&mut self, name: &str) -> bool {
        if !self.states.contains_key(name) {
            return false;
        }
        self.default_state = Some(name.to_string());
        true
    }

    /// Replaces states by name and, if given, the default state.
    ///
    /// The caller has already validated the merged result.
    pub(crate) fn commit(&mut self, states: HashMap<String, State>, default: Option<String>) {
        self.states = states;
        if default.is_some() {
            self.default_state = default;
        }
    }

    pub(crate) fn states_map(&self) -> &HashMap<String, State> {
        &self.states
    }
}
