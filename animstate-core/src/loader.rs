//! JSON loaders for state graphs.
//!
//! Two document layouts are accepted. The native layout:
//!
//! ```json
//! {
//!   "defaultState": "Idle",
//!   "states": [
//!     {
//!       "name": "Idle", "speed": 1.0, "animationClip": "idle",
//!       "transitions": [
//!         {"destinationState": "Run", "offset": 0.0, "duration": 0.25,
//!          "exitTime": 0.0, "conditions": [{"parameter": "run", "mode": 1}]}
//!       ]
//!     },
//!     {"name": "Run", "speed": 1.0, "animationClip": "run", "transitions": []}
//!   ]
//! }
//! ```
//!
//! and the Unity animator export, `{"layers": [{"stateMachine": <native>}]}`,
//! where only the first layer is read.
//!
//! Absent fields read as zero, empty string or empty list. A field of the
//! wrong JSON type fails the load. Every transition destination is checked
//! once the document is parsed; on any failure the graph is left as it was.

use crate::definition::{Condition, State, StateGraph, Transition};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;

/// Source document layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `{"states": [...]}`
    #[default]
    Native,
    /// `{"layers": [{"stateMachine": {...}}]}`
    Unity,
}

/// Native document as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NativeDocument {
    pub states: Vec<StateEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateEntry {
    pub name: String,
    pub speed: f32,
    pub animation_clip: String,
    pub transitions: Vec<TransitionEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionEntry {
    pub destination_state: String,
    pub offset: f32,
    pub duration: f32,
    pub exit_time: f32,
    pub conditions: Vec<ConditionEntry>,

    /// Written by [`StateGraph::to_native_json`]. Exporter documents omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_exit_time: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionEntry {
    pub parameter: String,
    pub mode: i64,
}

impl StateEntry {
    /// Builds the state, dropping transitions that have no condition.
    fn into_state(self) -> (State, usize) {
        let mut state = State::new(self.name).with_animation(self.animation_clip, self.speed);
        let mut skipped = 0;

        for entry in self.transitions {
            let Some(first) = entry.conditions.first() else {
                skipped += 1;
                continue;
            };

            let transition = Transition {
                trigger: first.parameter.clone(),
                from: state.name().to_string(),
                to: entry.destination_state,
                offset: entry.offset,
                duration: entry.duration,
                // Without an explicit flag it follows `duration`, not
                // `exitTime`, the way the exporter sets it.
                has_exit_time: entry.has_exit_time.unwrap_or(entry.duration != 0.0),
                exit_time: entry.exit_time,
                conditions: entry
                    .conditions
                    .into_iter()
                    .map(|c| Condition {
                        parameter: c.parameter,
                        mode: c.mode,
                    })
                    .collect(),
            };

            if !state.add_transition(transition) {
                skipped += 1;
            }
        }

        (state, skipped)
    }
}

impl StateGraph {
    /// Creates a graph from a native document.
    pub fn from_native_json(doc: &Value) -> Result<Self, CoreError> {
        let mut graph = Self::new();
        graph.load_native(doc)?;
        Ok(graph)
    }

    /// Creates a graph from a Unity animator export.
    pub fn from_unity_json(doc: &Value) -> Result<Self, CoreError> {
        let mut graph = Self::new();
        graph.load_unity(doc)?;
        Ok(graph)
    }

    /// Loads a native document into this graph.
    ///
    /// Loaded states replace existing states of the same name; other states
    /// are kept.
    pub fn load_native(&mut self, doc: &Value) -> Result<(), CoreError> {
        let doc = NativeDocument::deserialize(doc)?;
        self.load_document(doc)
    }

    /// Loads a Unity animator export into this graph.
    pub fn load_unity(&mut self, doc: &Value) -> Result<(), CoreError> {
        let first_layer = doc
            .get("layers")
            .and_then(Value::as_array)
            .and_then(|layers| layers.first())
            .ok_or(CoreError::MissingLayers)?;

        let state_machine = first_layer
            .get("stateMachine")
            .ok_or(CoreError::MissingStateMachine)?;

        self.load_native(state_machine)
    }

    /// Loads a document in the given dialect.
    pub fn load(&mut self, dialect: Dialect, doc: &Value) -> Result<(), CoreError> {
        match dialect {
            Dialect::Native => self.load_native(doc),
            Dialect::Unity => self.load_unity(doc),
        }
    }

    pub fn load_native_slice(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        let doc: Value = serde_json::from_slice(bytes)?;
        self.load_native(&doc)
    }

    pub fn load_unity_slice(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        let doc: Value = serde_json::from_slice(bytes)?;
        self.load_unity(&doc)
    }

    pub fn load_native_reader<R: Read>(&mut self, reader: R) -> Result<(), CoreError> {
        let doc: Value = serde_json::from_reader(reader)?;
        self.load_native(&doc)
    }

    pub fn load_unity_reader<R: Read>(&mut self, reader: R) -> Result<(), CoreError> {
        let doc: Value = serde_json::from_reader(reader)?;
        self.load_unity(&doc)
    }

    /// Serializes the graph as a native document, states sorted by name.
    ///
    /// Loading the result reproduces an equal graph. A transition whose
    /// conditions do not start with its trigger is written with a trigger
    /// condition (mode 0) prepended, and reloads with that condition.
    pub fn to_native_json(&self) -> Value {
        let mut states: Vec<&State> = self.states().collect();
        states.sort_by(|a, b| a.name().cmp(b.name()));

        let doc = NativeDocument {
            states: states
                .into_iter()
                .map(|state| {
                    let mut transitions: Vec<&Transition> = state.transitions().collect();
                    transitions.sort_by(|a, b| a.trigger.cmp(&b.trigger));
                    StateEntry {
                        name: state.name().to_string(),
                        speed: state.speed(),
                        animation_clip: state.animation_clip().to_string(),
                        transitions: transitions.into_iter().map(transition_entry).collect(),
                    }
                })
                .collect(),
            default_state: self.default_state().map(str::to_string),
        };

        serde_json::to_value(doc).unwrap_or(Value::Null)
    }

    fn load_document(&mut self, doc: NativeDocument) -> Result<(), CoreError> {
        let mut staged: HashMap<String, State> = self.states_map().clone();
        let loaded = doc.states.len();
        let mut skipped = 0;

        for entry in doc.states {
            let (state, dropped) = entry.into_state();
            skipped += dropped;
            staged.insert(state.name().to_string(), state);
        }

        validate_targets(&staged)?;

        if let Some(default) = &doc.default_state {
            if !staged.contains_key(default) {
                return Err(CoreError::UnknownState {
                    state: default.clone(),
                });
            }
        }

        self.commit(staged, doc.default_state);

        if skipped > 0 {
            tracing::debug!("skipped {} transitions without a usable trigger", skipped);
        }
        tracing::info!(
            "loaded {} states (graph now has {})",
            loaded,
            self.state_count()
        );

        Ok(())
    }
}

/// Trigger comes first in the condition list so it round-trips.
fn transition_entry(transition: &Transition) -> TransitionEntry {
    let mut conditions: Vec<ConditionEntry> = transition
        .conditions
        .iter()
        .map(|c| ConditionEntry {
            parameter: c.parameter.clone(),
            mode: c.mode,
        })
        .collect();
    if conditions.first().map(|c| c.parameter.as_str()) != Some(transition.trigger.as_str()) {
        conditions.insert(
            0,
            ConditionEntry {
                parameter: transition.trigger.clone(),
                mode: 0,
            },
        );
    }

    TransitionEntry {
        destination_state: transition.to.clone(),
        offset: transition.offset,
        duration: transition.duration,
        exit_time: transition.exit_time,
        conditions,
        has_exit_time: Some(transition.has_exit_time),
    }
}

fn validate_targets(states: &HashMap<String, State>) -> Result<(), CoreError> {
    for state in states.values() {
        for transition in state.transitions() {
            if !states.contains_key(&transition.to) {
                return Err(CoreError::DanglingTransition {
                    from: state.name().to_string(),
                    trigger: transition.trigger.clone(),
                    to: transition.to.clone(),
                });
            }
        }
    }
    Ok(())
}
