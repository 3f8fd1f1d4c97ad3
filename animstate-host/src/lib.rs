//! # animstate-host
//!
//! Host side of animstate.
//!
//! This crate provides:
//! - YAML configuration with environment overrides
//! - Graph loading from configured files
//! - A frame pulse that attaches a runner and ticks it once per frame

pub mod config;
pub mod error;
pub mod pulse;

pub use config::{Config, ConfigError, FrameConfig, GraphConfig, ScriptedTrigger};
pub use error::HostError;
pub use pulse::FramePulse;

use animstate_core::{StateGraph, StateMachine};
use std::sync::Arc;

/// Reads and loads the graph named by `config`.
pub fn load_graph(config: &GraphConfig) -> Result<StateGraph, HostError> {
    let bytes = std::fs::read(&config.path)?;
    let doc: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| HostError::Graph {
            path: config.path.display().to_string(),
            source: e.into(),
        })?;

    let mut graph = StateGraph::new();
    graph
        .load(config.dialect, &doc)
        .map_err(|source| HostError::Graph {
            path: config.path.display().to_string(),
            source,
        })?;
    Ok(graph)
}

/// Creates an instance in the configured initial state, or the graph default.
pub fn spawn_machine(
    graph: Arc<StateGraph>,
    config: &GraphConfig,
) -> Result<StateMachine, HostError> {
    let machine = match &config.initial_state {
        Some(state) => StateMachine::new(graph, state)?,
        None => StateMachine::with_default_state(graph)?,
    };
    Ok(machine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use animstate_core::{CoreError, Dialect};
    use serde_json::json;

    fn write_graph(dir: &tempfile::TempDir, doc: &serde_json::Value) -> std::path::PathBuf {
        let path = dir.path().join("graph.json");
        std::fs::write(&path, serde_json::to_vec(doc).unwrap()).unwrap();
        path
    }

    fn door() -> serde_json::Value {
        json!({
            "layers": [{"stateMachine": {
                "defaultState": "Locked",
                "states": [
                    {"name": "Locked", "transitions": [
                        {"destinationState": "Closed", "conditions": [{"parameter": "Closed"}]}
                    ]},
                    {"name": "Closed"}
                ]
            }}]
        })
    }

    #[test]
    fn test_load_unity_graph() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = GraphConfig {
            path: write_graph(&dir, &door()),
            dialect: Dialect::Unity,
            initial_state: None,
        };

        let graph = Arc::new(load_graph(&config).unwrap());
        assert_eq!(graph.state_count(), 2);

        let machine = spawn_machine(graph, &config).unwrap();
        assert_eq!(machine.current_state_name(), "Locked");
    }

    #[test]
    fn test_wrong_dialect_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = GraphConfig {
            path: write_graph(&dir, &json!({"states": []})),
            dialect: Dialect::Unity,
            initial_state: None,
        };

        let err = load_graph(&config).unwrap_err();
        assert!(err.is_user_error());
        match err {
            HostError::Graph { path, source } => {
                assert!(path.ends_with("graph.json"));
                assert!(matches!(source, CoreError::MissingLayers));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_graph_file() {
        let config = GraphConfig {
            path: "/nonexistent/graph.json".into(),
            ..Default::default()
        };
        assert!(matches!(load_graph(&config), Err(HostError::Io(_))));
    }

    #[test]
    fn test_unknown_initial_state() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = GraphConfig {
            path: write_graph(&dir, &door()),
            dialect: Dialect::Unity,
            initial_state: Some("Opened".to_string()),
        };

        let graph = Arc::new(load_graph(&config).unwrap());
        let err = spawn_machine(graph, &config).unwrap_err();
        assert!(matches!(
            err,
            HostError::Core(CoreError::UnknownState { .. })
        ));
    }
}
