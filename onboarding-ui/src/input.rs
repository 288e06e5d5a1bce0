//! Line-oriented commands for driving the flow from a terminal or script.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Press the continue button.
    Continue,
    /// Tap the n-th option on screen (1-based): a skill or a product.
    Choose(usize),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("options are numbered from 1")]
    ZeroChoice,

    #[error("unknown command '{0}' (type 'h' for help)")]
    Unknown(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "c" | "continue" => Ok(Self::Continue),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => match other.parse::<usize>() {
                Ok(0) => Err(ParseCommandError::ZeroChoice),
                Ok(n) => Ok(Self::Choose(n)),
                Err(_) => Err(ParseCommandError::Unknown(trimmed.to_string())),
            },
        }
    }
}

/// Splits a `--script` argument into command lines.
pub fn split_script(script: &str) -> Vec<String> {
    script.split(',').map(|s| s.trim().to_string()).collect()
}

pub const HELP: &str = "\
commands:
  <enter>, c, continue   press the continue button
  <n>                    pick option n on the current screen
  h, help, ?             show this help
  q, quit                leave onboarding";

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn blank_line_continues() {
        assert_eq!("".parse::<Command>(), Ok(Command::Continue));
        assert_eq!("  ".parse::<Command>(), Ok(Command::Continue));
        assert_eq!("Continue".parse::<Command>(), Ok(Command::Continue));
    }

    #[test]
    fn numbers_choose_options() {
        assert_eq!("2".parse::<Command>(), Ok(Command::Choose(2)));
        assert_eq!(" 3 ".parse::<Command>(), Ok(Command::Choose(3)));
        assert_eq!("0".parse::<Command>(), Err(ParseCommandError::ZeroChoice));
    }

    #[test]
    fn help_and_quit_aliases() {
        for help in ["h", "HELP", "?"] {
            assert_eq!(help.parse::<Command>(), Ok(Command::Help));
        }
        for quit in ["q", "quit", "exit"] {
            assert_eq!(quit.parse::<Command>(), Ok(Command::Quit));
        }
    }

    #[test]
    fn unknown_input_keeps_original_text() {
        assert_eq!(
            "Buy".parse::<Command>(),
            Err(ParseCommandError::Unknown("Buy".to_string()))
        );
        assert_eq!(
            "-1".parse::<Command>(),
            Err(ParseCommandError::Unknown("-1".to_string()))
        );
    }

    #[test]
    fn script_splits_on_commas() {
        assert_eq!(split_script("c, c,2 ,c"), vec!["c", "c", "2", "c"]);
    }
}
