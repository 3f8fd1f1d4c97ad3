//! # animstate-core
//!
//! Data-driven state machines for animation control.
//!
//! This crate provides:
//! - State graph definitions (states, transitions, trigger lookup)
//! - Loaders for the native JSON layout and Unity animator exports
//! - Instances that move through a shared graph on named triggers
//! - A runner that advances live instances once per host frame

pub mod definition;
pub mod error;
pub mod instance;
pub mod loader;
pub mod runner;

pub use definition::{Condition, State, StateGraph, Transition};
pub use error::CoreError;
pub use instance::{SharedMachine, StateMachine, TransitionEvent, TransitionObserver};
pub use loader::Dialect;
pub use runner::{create_runner, Runner};
