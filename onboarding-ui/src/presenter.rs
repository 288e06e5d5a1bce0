//! Presentation-side binding to the flow's observables.
//!
//! [`Screen`] keeps a [`Frame`] in sync with everything the flow publishes,
//! including the observables inside the current view (welcome layout, skill
//! and product selection), and flags when a redraw is due.

use std::cell::RefCell;
use std::rc::Rc;

use onboarding_core::{FlowOutputs, FlowState, FooterView, StepView, Subscription};

/// Snapshot of what is on screen.
#[derive(Debug, Clone)]
pub struct Frame {
    pub state: FlowState,
    pub progress_index: usize,
    pub total_step_count: usize,
    pub button_title: String,
    pub button_enabled: bool,
    pub view: Option<StepView>,
    pub footer: Option<FooterView>,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            state: FlowState::NotStarted,
            progress_index: 0,
            total_step_count: 0,
            button_title: String::new(),
            button_enabled: true,
            view: None,
            footer: None,
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    frame: Frame,
    dirty: bool,
    view_subscription: Option<Subscription>,
}

type SharedRef = Rc<RefCell<Shared>>;

fn update(
    shared: &SharedRef,
    apply: impl FnOnce(&mut Frame),
) {
    let mut shared = shared.borrow_mut();
    apply(&mut shared.frame);
    shared.dirty = true;
}

/// Watches the observable inside a view so in-view changes trigger a redraw.
fn watch_view(
    view: &StepView,
    shared: &SharedRef,
) -> Subscription {
    let weak = Rc::downgrade(shared);
    let mark_dirty = move || {
        if let Some(shared) = weak.upgrade() {
            shared.borrow_mut().dirty = true;
        }
    };
    match view {
        StepView::Welcome(view) => view.layout.subscribe(move |_| mark_dirty()),
        StepView::SelectSkill(view) => view.selected_index.subscribe(move |_| mark_dirty()),
        StepView::Paywall(view) => view.selected_product.subscribe(move |_| mark_dirty()),
    }
}

#[derive(Debug)]
pub struct Screen {
    shared: SharedRef,
    _subscriptions: Vec<Subscription>,
}

impl Screen {
    pub fn bind(outputs: &FlowOutputs) -> Self {
        let shared: SharedRef = Rc::default();
        let mut subscriptions = Vec::new();

        let s = Rc::clone(&shared);
        subscriptions.push(
            outputs
                .state
                .subscribe(move |state| update(&s, |f| f.state = *state)),
        );
        let s = Rc::clone(&shared);
        subscriptions.push(
            outputs
                .current_step_index
                .subscribe(move |index| update(&s, |f| f.progress_index = *index)),
        );
        let s = Rc::clone(&shared);
        subscriptions.push(
            outputs
                .total_step_count
                .subscribe(move |total| update(&s, |f| f.total_step_count = *total)),
        );
        let s = Rc::clone(&shared);
        subscriptions.push(
            outputs
                .button_title
                .subscribe(move |title| update(&s, |f| f.button_title = title.clone())),
        );
        let s = Rc::clone(&shared);
        subscriptions.push(
            outputs
                .is_button_enabled
                .subscribe(move |enabled| update(&s, |f| f.button_enabled = *enabled)),
        );
        let s = Rc::clone(&shared);
        subscriptions.push(
            outputs
                .current_footer
                .subscribe(move |footer| update(&s, |f| f.footer = footer.clone())),
        );
        let s = Rc::clone(&shared);
        subscriptions.push(outputs.current_view.subscribe(move |view| {
            // Detach from the previous view before the borrow below; dropping
            // a subscription touches that view's observable, not ours.
            let previous = s.borrow_mut().view_subscription.take();
            drop(previous);

            let watcher = view.as_ref().map(|v| watch_view(v, &s));
            let mut shared = s.borrow_mut();
            shared.frame.view = view.clone();
            shared.view_subscription = watcher;
            shared.dirty = true;
        }));

        Self {
            shared,
            _subscriptions: subscriptions,
        }
    }

    pub fn frame(&self) -> Frame {
        self.shared.borrow().frame.clone()
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn take_dirty(&self) -> bool {
        std::mem::take(&mut self.shared.borrow_mut().dirty)
    }

    #[cfg(test)]
    fn subscription_count(&self) -> usize {
        self._subscriptions.len()
    }
}
