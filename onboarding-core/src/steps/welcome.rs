use tracing::debug;

use super::{CompletionHandler, OnboardingStep, StepKind, StepView};
use crate::observable::Observable;

const SUB_STEP_COUNT: usize = 2;

/// Visual stage of the welcome screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomeLayout {
    /// Greeting only.
    Intro,
    /// Headline and artwork revealed.
    Expanded,
}

#[derive(Debug, Clone)]
pub struct WelcomeView {
    pub greeting: &'static str,
    pub headline: &'static str,
    pub layout: Observable<WelcomeLayout>,
}

/// Two-stage welcome screen. The first press reveals the headline, the
/// second finishes the step.
#[derive(Debug)]
pub struct WelcomeStep {
    current_sub_step_index: Observable<usize>,
    is_button_enabled: Observable<bool>,
    view: Option<WelcomeView>,
    on_step_finished: CompletionHandler<()>,
}

impl WelcomeStep {
    pub fn new(on_step_finished: CompletionHandler<()>) -> Self {
        Self {
            current_sub_step_index: Observable::new(0),
            is_button_enabled: Observable::new(true),
            view: None,
            on_step_finished,
        }
    }
}

impl OnboardingStep for WelcomeStep {
    type Output = ();

    fn kind(&self) -> StepKind {
        StepKind::Welcome
    }

    fn button_title(&self) -> &str {
        "Continue"
    }

    fn is_button_enabled(&self) -> &Observable<bool> {
        &self.is_button_enabled
    }

    fn sub_step_count(&self) -> usize {
        SUB_STEP_COUNT
    }

    fn current_sub_step_index(&self) -> &Observable<usize> {
        &self.current_sub_step_index
    }

    fn build_view(&mut self) -> StepView {
        let view = WelcomeView {
            greeting: "Welcome to djay!",
            headline: "Mix Your\nFavorite Music",
            layout: Observable::new(WelcomeLayout::Intro),
        };
        self.view = Some(view.clone());
        self.on_step_finished.arm();
        self.current_sub_step_index.send(0);
        StepView::Welcome(view)
    }

    fn handle_continue_pressed(&mut self) {
        if self.current_sub_step_index.get() + 1 >= SUB_STEP_COUNT {
            self.on_step_finished.finish(());
            return;
        }

        debug!("welcome: revealing headline");
        self.current_sub_step_index.send(1);
        if let Some(view) = &self.view {
            view.layout.send(WelcomeLayout::Expanded);
        }
    }

    fn on_step_finished(&self) -> &CompletionHandler<()> {
        &self.on_step_finished
    }
}
