use serde::Deserialize;
use thiserror::Error;

use crate::models::{DjSkill, PaywallCatalog};
use crate::steps::StepKind;

/// What happens when the final paywall step is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalBehavior {
    /// Start over at the first step.
    #[default]
    Restart,
    /// Leave the flow; nothing is shown afterwards.
    Finish,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowConfigError {
    #[error("onboarding flow has no steps")]
    EmptyFlow,

    #[error("skill selection step configured without any skill options")]
    NoSkillOptions,

    #[error("paywall step configured with an empty product catalog")]
    EmptyCatalog,
}

/// Static description of an onboarding flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    /// Steps in presentation order.
    pub steps: Vec<StepKind>,
    pub on_finish: TerminalBehavior,
    /// Skill used for paywall content when none was chosen.
    pub fallback_skill: DjSkill,
    pub skill_options: Vec<DjSkill>,
    #[serde(skip)]
    pub catalog: PaywallCatalog,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            steps: vec![StepKind::Welcome, StepKind::SelectSkill, StepKind::Paywall],
            on_finish: TerminalBehavior::default(),
            fallback_skill: DjSkill::Amateur,
            skill_options: DjSkill::all().to_vec(),
            catalog: PaywallCatalog::default(),
        }
    }
}

impl FlowConfig {
    pub fn with_steps(
        mut self,
        steps: Vec<StepKind>,
    ) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_terminal_behavior(
        mut self,
        on_finish: TerminalBehavior,
    ) -> Self {
        self.on_finish = on_finish;
        self
    }

    pub fn with_catalog(
        mut self,
        catalog: PaywallCatalog,
    ) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn validate(&self) -> Result<(), FlowConfigError> {
        if self.steps.is_empty() {
            return Err(FlowConfigError::EmptyFlow);
        }
        if self.steps.contains(&StepKind::SelectSkill) && self.skill_options.is_empty() {
            return Err(FlowConfigError::NoSkillOptions);
        }
        if self.steps.contains(&StepKind::Paywall) && self.catalog.is_empty() {
            return Err(FlowConfigError::EmptyCatalog);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(FlowConfig::default().validate(), Ok(()));
    }

    #[test]
    fn empty_steps_rejected() {
        let config = FlowConfig::default().with_steps(Vec::new());

        assert_eq!(config.validate(), Err(FlowConfigError::EmptyFlow));
    }

    #[test]
    fn skill_step_needs_options() {
        let config = FlowConfig {
            skill_options: Vec::new(),
            ..FlowConfig::default()
        };

        assert_eq!(config.validate(), Err(FlowConfigError::NoSkillOptions));
    }

    #[test]
    fn empty_options_allowed_without_skill_step() {
        let config = FlowConfig {
            skill_options: Vec::new(),
            ..FlowConfig::default()
        }
        .with_steps(vec![StepKind::Welcome]);

        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn paywall_needs_products() {
        let config =
            FlowConfig::default().with_catalog(PaywallCatalog::new("$", Vec::new()));

        assert_eq!(config.validate(), Err(FlowConfigError::EmptyCatalog));
    }

    #[test]
    fn deserializes_partial_toml_with_defaults() {
        let config: FlowConfig = toml::from_str(
            r#"
            steps = ["select_skill", "paywall"]
            on_finish = "finish"
            "#,
        )
        .unwrap();

        assert_eq!(config.steps, vec![StepKind::SelectSkill, StepKind::Paywall]);
        assert_eq!(config.on_finish, TerminalBehavior::Finish);
        assert_eq!(config.fallback_skill, DjSkill::Amateur);
        assert_eq!(config.catalog, PaywallCatalog::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<FlowConfig, _> = toml::from_str("colour = \"red\"");

        assert!(result.is_err());
    }
}
