use tracing::{debug, warn};

use super::{CompletionHandler, OnboardingStep, StepKind, StepView};
use crate::models::DjSkill;
use crate::observable::{Observable, Subscription};

/// Skill picker view model. The selection is observable so both the step
/// (button state) and the presentation layer (highlight) can follow it.
#[derive(Debug, Clone)]
pub struct SkillSelectionView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub options: Vec<DjSkill>,
    pub selected_index: Observable<Option<usize>>,
}

impl SkillSelectionView {
    fn new(options: Vec<DjSkill>) -> Self {
        Self {
            title: "Welcome DJ",
            subtitle: "What’s your DJ skill level?",
            options,
            selected_index: Observable::new(None),
        }
    }

    pub fn selected_skill(&self) -> Option<DjSkill> {
        self.selected_index
            .get()
            .and_then(|index| self.options.get(index).copied())
    }

    /// Marks `skill` as selected. Skills not offered are ignored.
    pub fn select(
        &self,
        skill: DjSkill,
    ) -> bool {
        match self.options.iter().position(|s| *s == skill) {
            Some(index) => {
                self.selected_index.send(Some(index));
                true
            }
            None => {
                warn!(%skill, "skill is not one of the offered options");
                false
            }
        }
    }
}

/// Asks the user for their DJ experience. The button stays disabled until a
/// skill is chosen.
#[derive(Debug)]
pub struct SelectSkillStep {
    options: Vec<DjSkill>,
    current_sub_step_index: Observable<usize>,
    is_button_enabled: Observable<bool>,
    view: Option<SkillSelectionView>,
    selection_subscription: Option<Subscription>,
    on_step_finished: CompletionHandler<DjSkill>,
}

impl SelectSkillStep {
    pub fn new(
        options: Vec<DjSkill>,
        on_step_finished: CompletionHandler<DjSkill>,
    ) -> Self {
        Self {
            options,
            current_sub_step_index: Observable::new(0),
            is_button_enabled: Observable::new(false),
            view: None,
            selection_subscription: None,
            on_step_finished,
        }
    }

    pub fn select_skill(
        &mut self,
        skill: DjSkill,
    ) -> bool {
        match &self.view {
            Some(view) => view.select(skill),
            None => {
                debug!(%skill, "skill selected before view was built; ignoring");
                false
            }
        }
    }

    pub fn selected_skill(&self) -> Option<DjSkill> {
        self.view.as_ref().and_then(SkillSelectionView::selected_skill)
    }
}

impl OnboardingStep for SelectSkillStep {
    type Output = DjSkill;

    fn kind(&self) -> StepKind {
        StepKind::SelectSkill
    }

    fn button_title(&self) -> &str {
        "Let's go"
    }

    fn is_button_enabled(&self) -> &Observable<bool> {
        &self.is_button_enabled
    }

    fn sub_step_count(&self) -> usize {
        1
    }

    fn current_sub_step_index(&self) -> &Observable<usize> {
        &self.current_sub_step_index
    }

    fn build_view(&mut self) -> StepView {
        let view = SkillSelectionView::new(self.options.clone());

        let enabled = self.is_button_enabled.clone();
        self.selection_subscription = Some(
            view.selected_index
                .subscribe(move |selected| enabled.send(selected.is_some())),
        );
        self.view = Some(view.clone());
        self.on_step_finished.arm();
        self.current_sub_step_index.send(0);

        StepView::SelectSkill(view)
    }

    fn handle_continue_pressed(&mut self) {
        let Some(skill) = self.selected_skill() else {
            debug!("continue pressed without a skill selection; ignoring");
            return;
        };
        self.on_step_finished.finish(skill);
    }

    fn on_step_finished(&self) -> &CompletionHandler<DjSkill> {
        &self.on_step_finished
    }
}
