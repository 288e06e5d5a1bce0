pub mod flow;
pub mod models;
pub mod observable;
pub mod steps;

pub use flow::{FlowConfig, FlowConfigError, FlowOutputs, FlowState, OnboardingFlow, TerminalBehavior};
pub use models::*;
pub use observable::{Observable, Subscription};
pub use steps::{FooterView, OnboardingStep, Step, StepKind, StepView};
