//! Plain-text rendering of a presentation frame.

use std::fmt::Write;

use onboarding_core::steps::{PaywallView, SkillSelectionView, WelcomeLayout, WelcomeView};
use onboarding_core::{FlowState, FooterView, PaywallBanner, StepView};

use crate::presenter::Frame;

const SELECTED: &str = "(•)";
const UNSELECTED: &str = "( )";

/// Page indicator: filled dots up to and including `index`.
pub fn page_indicator(
    index: usize,
    total: usize,
) -> String {
    (0..total)
        .map(|i| if i <= index { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn button(
    title: &str,
    enabled: bool,
) -> String {
    if enabled {
        format!("[ {title} ]")
    } else {
        format!("[ {title} ] (disabled)")
    }
}

fn marker(selected: bool) -> &'static str {
    if selected { SELECTED } else { UNSELECTED }
}

fn render_welcome(
    out: &mut String,
    view: &WelcomeView,
) {
    if view.layout.get() == WelcomeLayout::Expanded {
        for line in view.headline.lines() {
            let _ = writeln!(out, "  {line}");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "  {}", view.greeting);
}

fn render_skill_selection(
    out: &mut String,
    view: &SkillSelectionView,
) {
    let selected = view.selected_index.get();
    let _ = writeln!(out, "  {}", view.title);
    let _ = writeln!(out, "  {}", view.subtitle);
    out.push('\n');
    for (index, skill) in view.options.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {} {}. {}",
            marker(selected == Some(index)),
            index + 1,
            skill.description()
        );
    }
}

fn render_paywall(
    out: &mut String,
    view: &PaywallView,
) {
    let content = &view.content;
    let banner = match content.banner {
        PaywallBanner::Standard => "[djay]",
        PaywallBanner::Pro => "[djay PRO]",
    };
    let _ = writeln!(out, "  {banner} {}", content.title);
    let _ = writeln!(out, "  {}", content.subtitle);
    out.push('\n');
    for bullet in &content.bullet_points {
        let _ = writeln!(out, "  ✓ {bullet}");
    }
    out.push('\n');

    let selected = view.selected_product.get();
    for (index, offer) in content.offers.iter().enumerate() {
        let mut line = format!(
            "  {} {}. {:<8} {}",
            marker(selected == index),
            index + 1,
            offer.period.label(),
            offer.formatted_price
        );
        if let Some(secondary) = &offer.formatted_secondary_price {
            let _ = write!(line, "  {secondary}");
        }
        if let Some(savings) = &offer.savings_text {
            let _ = write!(line, "  {savings}");
        }
        let _ = writeln!(out, "{line}");
    }
}

pub fn render_view(view: &StepView) -> String {
    let mut out = String::new();
    match view {
        StepView::Welcome(view) => render_welcome(&mut out, view),
        StepView::SelectSkill(view) => render_skill_selection(&mut out, view),
        StepView::Paywall(view) => render_paywall(&mut out, view),
    }
    out
}

pub fn render_footer(footer: &FooterView) -> String {
    footer
        .actions
        .iter()
        .map(|action| action.label())
        .collect::<Vec<_>>()
        .join(" · ")
}

/// Renders a whole screen: header, body, footer or page indicator, button.
pub fn render_frame(frame: &Frame) -> String {
    let mut out = String::new();

    match frame.state {
        FlowState::NotStarted => return out,
        FlowState::Finished => {
            out.push_str("Onboarding complete.\n");
            return out;
        }
        FlowState::Active(_) => {}
    }

    let _ = writeln!(
        out,
        "── djay ── step {}/{}",
        frame.progress_index + 1,
        frame.total_step_count
    );
    out.push('\n');
    if let Some(view) = &frame.view {
        out.push_str(&render_view(view));
    }
    out.push('\n');

    match &frame.footer {
        Some(footer) => {
            let _ = writeln!(out, "  {}", render_footer(footer));
        }
        None => {
            let _ = writeln!(
                out,
                "  {}",
                page_indicator(frame.progress_index, frame.total_step_count)
            );
        }
    }
    let _ = writeln!(
        out,
        "  {}",
        button(&frame.button_title, frame.button_enabled)
    );
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn page_indicator_fills_through_current() {
        assert_eq!(page_indicator(0, 4), "● ○ ○ ○");
        assert_eq!(page_indicator(2, 4), "● ● ● ○");
        assert_eq!(page_indicator(3, 4), "● ● ● ●");
        assert_eq!(page_indicator(0, 0), "");
    }

    #[test]
    fn disabled_button_is_marked() {
        assert_eq!(button("Let's go", true), "[ Let's go ]");
        assert_eq!(button("Let's go", false), "[ Let's go ] (disabled)");
    }

    #[test]
    fn footer_joins_action_labels() {
        let footer = FooterView {
            actions: onboarding_core::FooterAction::all().to_vec(),
        };

        assert_eq!(
            render_footer(&footer),
            "Terms · Privacy policy · Restore Purchase"
        );
    }

    #[test]
    fn finished_frame_says_so() {
        let frame = Frame {
            state: FlowState::Finished,
            ..Frame::default()
        };

        assert_eq!(render_frame(&frame), "Onboarding complete.\n");
    }

    #[test]
    fn not_started_frame_is_empty() {
        assert_eq!(render_frame(&Frame::default()), "");
    }
}
