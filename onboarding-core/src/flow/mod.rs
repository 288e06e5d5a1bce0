//! Onboarding flow coordination.
//!
//! - `config` - which steps a flow contains and how it ends
//! - `coordinator` - the state machine driving the active step

mod config;
mod coordinator;

pub use config::{FlowConfig, FlowConfigError, TerminalBehavior};
pub use coordinator::{FlowOutputs, FlowState, OnboardingFlow};
