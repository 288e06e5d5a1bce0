//! Step sequencing and progress aggregation.
//!
//! [`OnboardingFlow`] owns every step of the flow, tracks which one is
//! active, and republishes the active step's state (button, view, footer,
//! progress) through its own observables. Steps report completion through
//! a handler bound at construction; the handler posts a [`FlowSignal`] into
//! a mailbox that the flow drains after each delegated input.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::config::{FlowConfig, FlowConfigError, TerminalBehavior};
use crate::models::DjSkill;
use crate::observable::{Observable, Subscription};
use crate::steps::{
    CarriedResult, CompletionHandler, FooterView, PaywallStep, SelectSkillStep, Step, StepKind,
    StepView, WelcomeStep,
};

/// Lifecycle of the flow as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    NotStarted,
    /// Index into the step sequence (not the global progress index).
    Active(usize),
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FlowSignal {
    Advance(Option<CarriedResult>),
    Restart,
    Finish,
}

#[derive(Debug, Clone, Default)]
struct Mailbox(Rc<RefCell<VecDeque<FlowSignal>>>);

impl Mailbox {
    fn post(
        &self,
        signal: FlowSignal,
    ) {
        self.0.borrow_mut().push_back(signal);
    }

    fn take(&self) -> Option<FlowSignal> {
        self.0.borrow_mut().pop_front()
    }
}

/// Observables the presentation layer binds to.
#[derive(Debug, Clone)]
pub struct FlowOutputs {
    /// Global progress index across all steps' sub-steps.
    pub current_step_index: Observable<usize>,
    /// Sum of all steps' sub-step counts; set once on start.
    pub total_step_count: Observable<usize>,
    pub button_title: Observable<String>,
    pub is_button_enabled: Observable<bool>,
    pub current_view: Observable<Option<StepView>>,
    /// When set, replaces the page indicator.
    pub current_footer: Observable<Option<FooterView>>,
    pub state: Observable<FlowState>,
}

impl Default for FlowOutputs {
    fn default() -> Self {
        Self {
            current_step_index: Observable::new(0),
            total_step_count: Observable::new(0),
            button_title: Observable::new(String::new()),
            is_button_enabled: Observable::new(true),
            current_view: Observable::new(None),
            current_footer: Observable::new(None),
            state: Observable::new(FlowState::NotStarted),
        }
    }
}

#[derive(Debug)]
pub struct OnboardingFlow {
    steps: Vec<Step>,
    active: Option<usize>,
    carried: Option<CarriedResult>,
    mailbox: Mailbox,
    step_subscriptions: Vec<Subscription>,
    outputs: FlowOutputs,
}

impl OnboardingFlow {
    /// Builds every step up front. Nothing is shown until [`start`](Self::start).
    pub fn new(config: FlowConfig) -> Result<Self, FlowConfigError> {
        config.validate()?;

        let mailbox = Mailbox::default();
        let steps = config
            .steps
            .iter()
            .map(|kind| build_step(*kind, &config, &mailbox))
            .collect();

        Ok(Self {
            steps,
            active: None,
            carried: None,
            mailbox,
            step_subscriptions: Vec::new(),
            outputs: FlowOutputs::default(),
        })
    }

    pub fn outputs(&self) -> &FlowOutputs {
        &self.outputs
    }

    pub fn state(&self) -> FlowState {
        self.outputs.state.get()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn active_step_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_step(&self) -> Option<&Step> {
        self.active.and_then(|index| self.steps.get(index))
    }

    pub fn active_step_kind(&self) -> Option<StepKind> {
        self.active_step().map(Step::kind)
    }

    /// Skill chosen earlier in the flow, if any.
    pub fn carried_skill(&self) -> Option<DjSkill> {
        match self.carried {
            Some(CarriedResult::Skill(skill)) => Some(skill),
            None => None,
        }
    }

    pub fn current_step_index(&self) -> usize {
        self.outputs.current_step_index.get()
    }

    pub fn total_step_count(&self) -> usize {
        self.outputs.total_step_count.get()
    }

    pub fn is_button_enabled(&self) -> bool {
        self.outputs.is_button_enabled.get()
    }

    pub fn button_title(&self) -> String {
        self.outputs.button_title.get()
    }

    pub fn start(&mut self) {
        if self.state() != FlowState::NotStarted {
            warn!(state = ?self.state(), "onboarding flow already started");
            return;
        }

        let total: usize = self.steps.iter().map(Step::sub_step_count).sum();
        self.outputs.total_step_count.send(total);
        info!(steps = self.steps.len(), total_sub_steps = total, "starting onboarding");

        self.transition_to(0);
    }

    /// Forwards a continue press to the active step. Whether the flow moves
    /// on is up to the step's completion handler.
    pub fn handle_continue_pressed(&mut self) {
        let Some(step) = self.active.and_then(|index| self.steps.get_mut(index)) else {
            debug!("continue pressed with no active step; ignoring");
            return;
        };
        step.handle_continue_pressed();
        self.process_signals();
    }

    pub fn select_skill(
        &mut self,
        skill: DjSkill,
    ) -> bool {
        let accepted = match self.active.and_then(|index| self.steps.get_mut(index)) {
            Some(step) => step.select_skill(skill),
            None => false,
        };
        self.process_signals();
        accepted
    }

    pub fn select_product(
        &mut self,
        index: usize,
    ) -> bool {
        let accepted = match self.active.and_then(|active| self.steps.get_mut(active)) {
            Some(step) => step.select_product(index),
            None => false,
        };
        self.process_signals();
        accepted
    }

    fn process_signals(&mut self) {
        while let Some(signal) = self.mailbox.take() {
            match signal {
                FlowSignal::Advance(carried) => {
                    if let Some(carried) = carried {
                        self.inject(carried);
                    }
                    self.advance();
                }
                FlowSignal::Restart | FlowSignal::Finish if self.has_next_step() => {
                    debug!(?signal, "terminal signal before the last step; advancing");
                    self.advance();
                }
                FlowSignal::Restart => {
                    info!("final step completed; restarting onboarding");
                    self.transition_to(0);
                }
                FlowSignal::Finish => self.finish(),
            }
        }
    }

    /// Stores `carried` and configures every step after the active one.
    fn inject(
        &mut self,
        carried: CarriedResult,
    ) {
        debug!(?carried, "carrying step result forward");
        self.carried = Some(carried);
        let first_later = self.active.map_or(0, |index| index + 1);
        for step in self.steps.iter_mut().skip(first_later) {
            step.configure(carried);
        }
    }

    fn has_next_step(&self) -> bool {
        self.active
            .is_some_and(|index| index + 1 < self.steps.len())
    }

    fn advance(&mut self) {
        let Some(current) = self.active else {
            return;
        };
        let next = current + 1;
        if next >= self.steps.len() {
            warn!(current, "no step after the last one; staying put");
            return;
        }
        self.transition_to(next);
    }

    fn sub_steps_before(
        &self,
        index: usize,
    ) -> usize {
        self.steps[..index].iter().map(Step::sub_step_count).sum()
    }

    /// Deactivates the current step and activates `index`.
    ///
    /// Observers are attached before `build_view` so the sub-step reset it
    /// emits reaches the global progress index.
    fn transition_to(
        &mut self,
        index: usize,
    ) {
        if index >= self.steps.len() {
            warn!(index, "transition to missing step ignored");
            return;
        }

        self.step_subscriptions.clear();
        self.active = Some(index);

        let offset = self.sub_steps_before(index);
        let step = &mut self.steps[index];

        let progress = self.outputs.current_step_index.clone();
        self.step_subscriptions
            .push(step.current_sub_step_index().subscribe(move |sub_step| {
                debug!(sub_step, global = offset + sub_step, "progress");
                progress.send(offset + sub_step);
            }));

        let enabled = self.outputs.is_button_enabled.clone();
        self.step_subscriptions.push(
            step.is_button_enabled()
                .subscribe(move |is_enabled| enabled.send(*is_enabled)),
        );

        let view = step.build_view();
        let footer = step.build_footer_view();

        self.outputs
            .button_title
            .send(step.button_title().to_string());
        self.outputs.current_view.send(Some(view));
        self.outputs.current_footer.send(footer);
        info!(step = %step.kind(), index, "activated onboarding step");
        self.outputs.state.send(FlowState::Active(index));
    }

    fn finish(&mut self) {
        info!("onboarding finished");
        self.step_subscriptions.clear();
        self.active = None;
        self.outputs.current_view.send(None);
        self.outputs.current_footer.send(None);
        self.outputs.button_title.send(String::new());
        self.outputs.is_button_enabled.send(false);
        self.outputs.current_step_index.send(0);
        self.outputs.state.send(FlowState::Finished);
    }
}

fn build_step(
    kind: StepKind,
    config: &FlowConfig,
    mailbox: &Mailbox,
) -> Step {
    match kind {
        StepKind::Welcome => {
            let mailbox = mailbox.clone();
            Step::Welcome(WelcomeStep::new(CompletionHandler::new(move |()| {
                mailbox.post(FlowSignal::Advance(None))
            })))
        }
        StepKind::SelectSkill => {
            let mailbox = mailbox.clone();
            Step::SelectSkill(SelectSkillStep::new(
                config.skill_options.clone(),
                CompletionHandler::new(move |skill: DjSkill| {
                    info!(%skill, "skill selected");
                    mailbox.post(FlowSignal::Advance(Some(CarriedResult::Skill(skill))))
                }),
            ))
        }
        StepKind::Paywall => {
            let mailbox = mailbox.clone();
            let signal = match config.on_finish {
                TerminalBehavior::Restart => FlowSignal::Restart,
                TerminalBehavior::Finish => FlowSignal::Finish,
            };
            Step::Paywall(PaywallStep::new(
                config.catalog.clone(),
                config.fallback_skill,
                CompletionHandler::new(move |()| mailbox.post(signal.clone())),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;

    fn started(config: FlowConfig) -> OnboardingFlow {
        let mut flow = OnboardingFlow::new(config).unwrap();
        flow.start();
        flow
    }

    /// Recomputes the global index from the step states.
    fn expected_global_index(flow: &OnboardingFlow) -> usize {
        let active = flow.active_step_index().unwrap();
        flow.steps()[..active]
            .iter()
            .map(Step::sub_step_count)
            .sum::<usize>()
            + flow.steps()[active].current_sub_step_index().get()
    }

    #[test]
    fn not_started_until_start() {
        let flow = OnboardingFlow::new(FlowConfig::default()).unwrap();

        assert_eq!(flow.state(), FlowState::NotStarted);
        assert_eq!(flow.total_step_count(), 0);
        assert!(flow.outputs().current_view.get().is_none());
    }

    #[test]
    fn start_activates_first_step_and_counts_sub_steps() {
        let flow = started(FlowConfig::default());

        assert_eq!(flow.state(), FlowState::Active(0));
        assert_eq!(flow.total_step_count(), 4);
        assert_eq!(flow.current_step_index(), 0);
        assert_eq!(flow.button_title(), "Continue");
        assert_eq!(flow.active_step_kind(), Some(StepKind::Welcome));
    }

    #[test]
    fn second_start_is_ignored() {
        let mut flow = started(FlowConfig::default());
        flow.handle_continue_pressed();

        flow.start();

        assert_eq!(flow.current_step_index(), 1);
    }

    #[test]
    fn continue_before_start_is_noop() {
        let mut flow = OnboardingFlow::new(FlowConfig::default()).unwrap();

        flow.handle_continue_pressed();

        assert_eq!(flow.state(), FlowState::NotStarted);
    }

    #[test]
    fn global_index_tracks_sub_steps_across_steps() {
        let mut flow = started(FlowConfig::default());
        assert_eq!(flow.current_step_index(), expected_global_index(&flow));

        flow.handle_continue_pressed();
        assert_eq!(flow.current_step_index(), 1);
        assert_eq!(flow.current_step_index(), expected_global_index(&flow));

        flow.handle_continue_pressed();
        assert_eq!(flow.current_step_index(), 2);
        assert_eq!(flow.current_step_index(), expected_global_index(&flow));
    }

    #[test]
    fn select_skill_step_gates_continue() {
        let mut flow = started(FlowConfig::default());
        flow.handle_continue_pressed();
        flow.handle_continue_pressed();
        assert_eq!(flow.active_step_kind(), Some(StepKind::SelectSkill));
        assert!(!flow.is_button_enabled());

        flow.handle_continue_pressed();
        assert_eq!(flow.active_step_kind(), Some(StepKind::SelectSkill));

        assert!(flow.select_skill(DjSkill::New));
        assert!(flow.is_button_enabled());
        assert_eq!(flow.button_title(), "Let's go");
    }

    #[test]
    fn chosen_skill_configures_paywall() {
        let mut flow = started(FlowConfig::default());
        flow.handle_continue_pressed();
        flow.handle_continue_pressed();
        flow.select_skill(DjSkill::Professional);

        flow.handle_continue_pressed();

        assert_eq!(flow.carried_skill(), Some(DjSkill::Professional));
        match flow.outputs().current_view.get() {
            Some(StepView::Paywall(view)) => {
                assert_eq!(view.content.skill, DjSkill::Professional)
            }
            other => panic!("expected paywall, got {other:?}"),
        }
        assert!(flow.outputs().current_footer.get().is_some());
        assert_eq!(flow.button_title(), "Continue for free");
    }

    #[test]
    fn wrap_resets_progress_even_with_stale_welcome_sub_step() {
        let mut flow = started(FlowConfig::default());
        let history = Rc::new(RefCell::new(Vec::new()));
        let _watch = {
            let history = Rc::clone(&history);
            flow.outputs()
                .current_step_index
                .subscribe(move |index| history.borrow_mut().push(*index))
        };

        flow.handle_continue_pressed();
        flow.handle_continue_pressed();
        flow.select_skill(DjSkill::Amateur);
        flow.handle_continue_pressed();
        flow.handle_continue_pressed();

        assert_eq!(flow.state(), FlowState::Active(0));
        assert_eq!(flow.current_step_index(), 0);
        // Observers attach before build_view: the stale welcome sub-step is
        // replayed first, then the reset to 0 follows.
        let history = history.borrow();
        assert_eq!(history[history.len() - 3..], [3, 1, 0]);
        assert_eq!(flow.current_step_index(), expected_global_index(&flow));
    }

    #[test]
    fn old_step_no_longer_drives_progress() {
        let mut flow = started(FlowConfig::default());
        flow.handle_continue_pressed();
        flow.handle_continue_pressed();
        assert_eq!(flow.current_step_index(), 2);

        flow.steps()[0].current_sub_step_index().send(1);

        assert_eq!(flow.current_step_index(), 2);
        assert_eq!(flow.steps()[0].current_sub_step_index().subscriber_count(), 0);
    }

    #[test]
    fn finish_behavior_ends_flow() {
        let mut flow = started(
            FlowConfig::default()
                .with_steps(vec![StepKind::Paywall])
                .with_terminal_behavior(TerminalBehavior::Finish),
        );

        flow.handle_continue_pressed();

        assert_eq!(flow.state(), FlowState::Finished);
        assert!(flow.outputs().current_view.get().is_none());
        assert!(flow.outputs().current_footer.get().is_none());
        assert_eq!(flow.active_step_index(), None);
        assert!(!flow.is_button_enabled());
        assert_eq!(flow.current_step_index(), 0);

        flow.handle_continue_pressed();
        assert_eq!(flow.state(), FlowState::Finished);
    }

    #[test]
    fn paywall_before_last_step_advances_instead_of_wrapping() {
        let mut flow = started(
            FlowConfig::default().with_steps(vec![StepKind::Paywall, StepKind::Welcome]),
        );

        flow.handle_continue_pressed();

        assert_eq!(flow.state(), FlowState::Active(1));
        assert_eq!(flow.active_step_kind(), Some(StepKind::Welcome));
        assert_eq!(flow.current_step_index(), 1);
    }

    #[test]
    fn paywall_before_last_step_does_not_finish_early() {
        let mut flow = started(
            FlowConfig::default()
                .with_steps(vec![StepKind::Paywall, StepKind::Welcome])
                .with_terminal_behavior(TerminalBehavior::Finish),
        );

        flow.handle_continue_pressed();
        assert_eq!(flow.state(), FlowState::Active(1));

        flow.handle_continue_pressed();
        flow.handle_continue_pressed();
        assert_eq!(flow.state(), FlowState::Active(1));
    }

    #[test]
    fn advancing_past_last_step_is_noop() {
        let mut flow = started(FlowConfig::default().with_steps(vec![StepKind::Welcome]));

        flow.handle_continue_pressed();
        flow.handle_continue_pressed();

        assert_eq!(flow.state(), FlowState::Active(0));
        assert_eq!(flow.current_step_index(), 1);

        flow.handle_continue_pressed();
        assert_eq!(flow.state(), FlowState::Active(0));
    }

    #[test]
    fn paywall_without_skill_step_uses_fallback() {
        let flow = started(FlowConfig::default().with_steps(vec![StepKind::Paywall]));

        match flow.outputs().current_view.get() {
            Some(StepView::Paywall(view)) => assert_eq!(view.content.skill, DjSkill::Amateur),
            other => panic!("expected paywall, got {other:?}"),
        }
    }

    #[test]
    fn selection_routes_only_to_matching_step() {
        let mut flow = started(FlowConfig::default());

        assert!(!flow.select_skill(DjSkill::New));
        assert!(!flow.select_product(0));
    }

    #[test]
    fn enabled_mirror_follows_active_step_only() {
        let mut flow = started(FlowConfig::default());
        flow.handle_continue_pressed();
        flow.handle_continue_pressed();
        assert!(!flow.is_button_enabled());

        flow.steps()[0].is_button_enabled().send(true);

        assert!(!flow.is_button_enabled());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = OnboardingFlow::new(FlowConfig::default().with_steps(Vec::new()));

        assert_eq!(result.err(), Some(FlowConfigError::EmptyFlow));
    }
}
