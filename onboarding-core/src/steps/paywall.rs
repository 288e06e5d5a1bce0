use std::rc::Rc;

use tracing::{debug, info, warn};

use super::{CompletionHandler, FooterView, OnboardingStep, StepKind, StepView};
use crate::models::{DjSkill, PaywallCatalog, PaywallContent};
use crate::observable::Observable;

#[derive(Debug, Clone)]
pub struct PaywallView {
    pub content: Rc<PaywallContent>,
    pub selected_product: Observable<usize>,
}

impl PaywallView {
    pub fn select_product(
        &self,
        index: usize,
    ) -> bool {
        if index >= self.content.offers.len() {
            warn!(
                index,
                available = self.content.offers.len(),
                "product index out of range"
            );
            return false;
        }
        self.selected_product.send(index);
        true
    }
}

/// Subscription offer. Continuing always finishes the step; no purchase is
/// made.
#[derive(Debug)]
pub struct PaywallStep {
    catalog: PaywallCatalog,
    fallback_skill: DjSkill,
    skill: Option<DjSkill>,
    current_sub_step_index: Observable<usize>,
    is_button_enabled: Observable<bool>,
    view: Option<PaywallView>,
    on_step_finished: CompletionHandler<()>,
}

impl PaywallStep {
    pub fn new(
        catalog: PaywallCatalog,
        fallback_skill: DjSkill,
        on_step_finished: CompletionHandler<()>,
    ) -> Self {
        Self {
            catalog,
            fallback_skill,
            skill: None,
            current_sub_step_index: Observable::new(0),
            is_button_enabled: Observable::new(true),
            view: None,
            on_step_finished,
        }
    }

    pub fn skill(&self) -> Option<DjSkill> {
        self.skill
    }

    /// Sets the skill the next `build_view` tailors its content to.
    pub fn set_skill(
        &mut self,
        skill: Option<DjSkill>,
    ) {
        self.skill = skill;
    }

    pub fn select_product(
        &mut self,
        index: usize,
    ) -> bool {
        match &self.view {
            Some(view) => view.select_product(index),
            None => false,
        }
    }

    pub fn selected_product(&self) -> Option<usize> {
        self.view.as_ref().map(|view| view.selected_product.get())
    }
}

impl OnboardingStep for PaywallStep {
    type Output = ();

    fn kind(&self) -> StepKind {
        StepKind::Paywall
    }

    fn button_title(&self) -> &str {
        "Continue for free"
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
        let skill = self.skill.unwrap_or(self.fallback_skill);
        debug!(%skill, carried = self.skill.is_some(), "building paywall");

        let view = PaywallView {
            content: Rc::new(PaywallContent::for_skill(skill, &self.catalog)),
            selected_product: Observable::new(0),
        };
        self.view = Some(view.clone());
        self.on_step_finished.arm();
        self.current_sub_step_index.send(0);

        StepView::Paywall(view)
    }

    fn build_footer_view(&self) -> Option<FooterView> {
        Some(FooterView {
            actions: self
                .view
                .as_ref()
                .map(|view| view.content.footer_actions.clone())
                .unwrap_or_default(),
        })
    }

    fn handle_continue_pressed(&mut self) {
        info!(
            selected_product = ?self.selected_product(),
            "continuing without purchase"
        );
        self.on_step_finished.finish(());
    }

    fn on_step_finished(&self) -> &CompletionHandler<()> {
        &self.on_step_finished
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{FooterAction, PaywallBanner};

    fn step_with_counter() -> (PaywallStep, Rc<Cell<u32>>) {
        let finished = Rc::new(Cell::new(0));
        let counter = Rc::clone(&finished);
        let step = PaywallStep::new(
            PaywallCatalog::default(),
            DjSkill::Amateur,
            CompletionHandler::new(move |()| counter.set(counter.get() + 1)),
        );
        (step, finished)
    }

    fn paywall_view(step: &mut PaywallStep) -> PaywallView {
        match step.build_view() {
            StepView::Paywall(view) => view,
            other => panic!("expected paywall view, got {:?}", other.kind()),
        }
    }

    #[test]
    fn falls_back_to_amateur_content() {
        let (mut step, _) = step_with_counter();

        let view = paywall_view(&mut step);

        assert_eq!(view.content.skill, DjSkill::Amateur);
    }

    #[test]
    fn carried_skill_configures_content() {
        let (mut step, _) = step_with_counter();
        step.set_skill(Some(DjSkill::Professional));

        let view = paywall_view(&mut step);

        assert_eq!(view.content.skill, DjSkill::Professional);
        assert_eq!(view.content.banner, PaywallBanner::Pro);
    }

    #[test]
    fn continue_finishes_regardless_of_product_selection() {
        let (mut step, finished) = step_with_counter();
        let _view = paywall_view(&mut step);
        assert!(step.select_product(1));

        step.handle_continue_pressed();

        assert_eq!(finished.get(), 1);

        let _again = paywall_view(&mut step);
        step.handle_continue_pressed();

        assert_eq!(finished.get(), 2);
    }

    #[test]
    fn out_of_range_product_is_ignored() {
        let (mut step, _) = step_with_counter();
        let view = paywall_view(&mut step);

        assert!(!step.select_product(2));
        assert_eq!(view.selected_product.get(), 0);
    }

    #[test]
    fn footer_lists_legal_actions() {
        let (mut step, _) = step_with_counter();
        let _view = paywall_view(&mut step);

        let footer = step.build_footer_view().expect("paywall has a footer");

        assert_eq!(footer.actions, FooterAction::all().to_vec());
    }
}
