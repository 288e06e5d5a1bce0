//! Onboarding steps.
//!
//! Each step owns its sub-step progress, the state of the shared continue
//! button while it is active, and a completion handler bound at construction.
//! The coordinator only sees steps through [`Step`], a closed set of the
//! concrete implementations:
//! - `welcome` - two-stage welcome screen
//! - `select_skill` - skill level picker, produces a [`DjSkill`]
//! - `paywall` - subscription offer, configured by the chosen skill

mod paywall;
mod select_skill;
mod welcome;

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{DjSkill, FooterAction};
use crate::observable::Observable;

pub use paywall::{PaywallStep, PaywallView};
pub use select_skill::{SelectSkillStep, SkillSelectionView};
pub use welcome::{WelcomeLayout, WelcomeStep, WelcomeView};

/// Identifies a concrete step type, e.g. in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Welcome,
    SelectSkill,
    Paywall,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::SelectSkill => "select_skill",
            Self::Paywall => "paywall",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A result produced by one step that configures a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarriedResult {
    Skill(DjSkill),
}

/// Opaque handle to what the active step wants on screen.
#[derive(Debug, Clone)]
pub enum StepView {
    Welcome(WelcomeView),
    SelectSkill(SkillSelectionView),
    Paywall(PaywallView),
}

impl StepView {
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Welcome(_) => StepKind::Welcome,
            Self::SelectSkill(_) => StepKind::SelectSkill,
            Self::Paywall(_) => StepKind::Paywall,
        }
    }
}

/// Secondary content shown next to the continue button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterView {
    pub actions: Vec<FooterAction>,
}

/// One-shot completion channel from a step to whoever constructed it.
///
/// The handler is armed each time the step builds its view and fires at most
/// once per arming.
pub struct CompletionHandler<R> {
    callback: Box<dyn Fn(R)>,
    armed: Cell<bool>,
}

impl<R> CompletionHandler<R> {
    pub fn new(callback: impl Fn(R) + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            armed: Cell::new(false),
        }
    }

    pub(crate) fn arm(&self) {
        self.armed.set(true);
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&self) -> bool {
        self.armed.get()
    }

    /// Delivers `result` if the handler is armed. Returns whether it fired.
    pub fn finish(
        &self,
        result: R,
    ) -> bool {
        if !self.armed.replace(false) {
            debug!("step already finished in this activation; ignoring");
            return false;
        }
        (self.callback)(result);
        true
    }
}

impl<R> fmt::Debug for CompletionHandler<R> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("CompletionHandler")
            .field("armed", &self.armed.get())
            .finish()
    }
}

/// Contract every onboarding step implements.
pub trait OnboardingStep {
    /// Payload delivered through the completion handler.
    type Output;

    fn kind(&self) -> StepKind;

    /// Label of the shared continue button while this step is active.
    fn button_title(&self) -> &str;

    fn is_button_enabled(&self) -> &Observable<bool>;

    /// Number of ticks this step contributes to the page indicator. Always >= 1.
    fn sub_step_count(&self) -> usize;

    /// Progress within the step, in `0..sub_step_count()`.
    fn current_sub_step_index(&self) -> &Observable<usize>;

    /// Produces a fresh view and resets per-activation state.
    fn build_view(&mut self) -> StepView;

    fn build_footer_view(&self) -> Option<FooterView> {
        None
    }

    fn handle_continue_pressed(&mut self);

    fn on_step_finished(&self) -> &CompletionHandler<Self::Output>;
}

/// The closed set of steps a flow can contain.
#[derive(Debug)]
pub enum Step {
    Welcome(WelcomeStep),
    SelectSkill(SelectSkillStep),
    Paywall(PaywallStep),
}

macro_rules! dispatch {
    ($step:expr, $inner:ident => $body:expr) => {
        match $step {
            Step::Welcome($inner) => $body,
            Step::SelectSkill($inner) => $body,
            Step::Paywall($inner) => $body,
        }
    };
}

impl Step {
    pub fn kind(&self) -> StepKind {
        dispatch!(self, s => s.kind())
    }

    pub fn button_title(&self) -> &str {
        dispatch!(self, s => s.button_title())
    }

    pub fn is_button_enabled(&self) -> &Observable<bool> {
        dispatch!(self, s => s.is_button_enabled())
    }

    pub fn sub_step_count(&self) -> usize {
        dispatch!(self, s => s.sub_step_count())
    }

    pub fn current_sub_step_index(&self) -> &Observable<usize> {
        dispatch!(self, s => s.current_sub_step_index())
    }

    pub fn build_view(&mut self) -> StepView {
        dispatch!(self, s => s.build_view())
    }

    pub fn build_footer_view(&self) -> Option<FooterView> {
        dispatch!(self, s => s.build_footer_view())
    }

    pub fn handle_continue_pressed(&mut self) {
        dispatch!(self, s => s.handle_continue_pressed())
    }

    /// Routes a skill tap. Only the skill picker accepts it.
    pub fn select_skill(
        &mut self,
        skill: DjSkill,
    ) -> bool {
        match self {
            Step::SelectSkill(step) => step.select_skill(skill),
            other => {
                debug!(step = %other.kind(), %skill, "skill selection ignored");
                false
            }
        }
    }

    /// Routes a product tap. Only the paywall accepts it.
    pub fn select_product(
        &mut self,
        index: usize,
    ) -> bool {
        match self {
            Step::Paywall(step) => step.select_product(index),
            other => {
                debug!(step = %other.kind(), index, "product selection ignored");
                false
            }
        }
    }

    /// Hands a result from an earlier step to this one.
    pub fn configure(
        &mut self,
        carried: CarriedResult,
    ) {
        match (self, carried) {
            (Step::Paywall(step), CarriedResult::Skill(skill)) => step.set_skill(Some(skill)),
            (Step::Welcome(_) | Step::SelectSkill(_), _) => {}
        }
    }
}
