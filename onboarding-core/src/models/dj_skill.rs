use std::fmt;

use serde::{Deserialize, Serialize};

/// Self-reported DJ experience, chosen during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DjSkill {
    New,
    Amateur,
    Professional,
}

impl DjSkill {
    /// All skills in presentation order.
    pub fn all() -> &'static [DjSkill] {
        &[DjSkill::New, DjSkill::Amateur, DjSkill::Professional]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Amateur => "amateur",
            Self::Professional => "professional",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "amateur" => Some(Self::Amateur),
            "professional" => Some(Self::Professional),
            _ => None,
        }
    }

    /// Option label shown on the skill selection screen.
    pub fn description(&self) -> &'static str {
        match self {
            Self::New => "I’m new to DJing",
            Self::Amateur => "I’ve used DJ apps before",
            Self::Professional => "I’m a professional DJ",
        }
    }
}

impl fmt::Display for DjSkill {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
