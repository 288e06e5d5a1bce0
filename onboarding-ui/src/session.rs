//! Drives an [`OnboardingFlow`] from a sequence of command lines.

use std::io::{self, Write};

use anyhow::{Context, Result};
use onboarding_core::{FlowState, OnboardingFlow, StepView};
use tracing::{debug, info};

use crate::input::{Command, HELP};
use crate::presenter::Screen;
use crate::render::render_frame;

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Quit,
    InputExhausted,
    Finished,
}

/// Routes the n-th on-screen option to the active step.
fn choose(
    flow: &mut OnboardingFlow,
    screen: &Screen,
    number: usize,
) -> Option<String> {
    let index = number - 1;
    match screen.frame().view {
        Some(StepView::SelectSkill(view)) => match view.options.get(index) {
            Some(skill) => {
                flow.select_skill(*skill);
                None
            }
            None => Some(format!("pick a skill between 1 and {}", view.options.len())),
        },
        Some(StepView::Paywall(view)) => {
            if flow.select_product(index) {
                None
            } else {
                Some(format!(
                    "pick a product between 1 and {}",
                    view.content.offers.len()
                ))
            }
        }
        _ => Some("nothing to choose on this screen".to_string()),
    }
}

fn draw<W: Write>(
    screen: &Screen,
    out: &mut W,
) -> Result<()> {
    if screen.take_dirty() {
        writeln!(out, "{}", render_frame(&screen.frame())).context("failed to write frame")?;
    }
    Ok(())
}

/// Starts `flow` if needed and applies `lines` until quit, end of input, or
/// the flow finishes. Frames are written to `out` whenever they change.
///
/// A failed read ends the session with an error.
pub fn run_session<I, W>(
    flow: &mut OnboardingFlow,
    lines: I,
    out: &mut W,
) -> Result<SessionOutcome>
where
    I: IntoIterator<Item = io::Result<String>>,
    W: Write,
{
    let screen = Screen::bind(flow.outputs());
    if flow.state() == FlowState::NotStarted {
        flow.start();
    }
    draw(&screen, out)?;

    for line in lines {
        let line = line.context("failed to read command")?;
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{e}").context("failed to write message")?;
                continue;
            }
        };
        debug!(?command, "input");

        match command {
            Command::Continue => flow.handle_continue_pressed(),
            Command::Choose(number) => {
                if let Some(message) = choose(flow, &screen, number) {
                    writeln!(out, "{message}").context("failed to write message")?;
                }
            }
            Command::Help => writeln!(out, "{HELP}").context("failed to write help")?,
            Command::Quit => {
                info!("user left onboarding");
                return Ok(SessionOutcome::Quit);
            }
        }

        draw(&screen, out)?;
        if flow.state() == FlowState::Finished {
            return Ok(SessionOutcome::Finished);
        }
    }

    Ok(SessionOutcome::InputExhausted)
}
