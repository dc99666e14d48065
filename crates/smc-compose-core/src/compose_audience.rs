use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ComposeCoreError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Entity category a compose session targets.
pub enum Audience {
    #[default]
    None,
    Claims,
    Employer,
}

impl Audience {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Claims => "CLAIMS",
            Self::Employer => "EMPLOYER",
        }
    }

    /// Backend identifier type (`BusinessDataType` on threads).
    pub fn audience_type(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Claims => "ClaimId",
            Self::Employer => "AccountId",
        }
    }

    /// Backend audience code used to key entity lookups.
    pub fn audience_code(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Claims => "1",
            Self::Employer => "2",
        }
    }

    /// Lower-case segment used in compose routes (`compose/claims`).
    pub fn route_segment(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Claims => "claims",
            Self::Employer => "employer",
        }
    }

    pub fn from_business_data_type(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Claims),
            2 => Some(Self::Employer),
            _ => None,
        }
    }

    pub fn is_selected(self) -> bool {
        self != Self::None
    }

    /// Parses a route or payload audience, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, ComposeCoreError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CLAIMS" => Ok(Self::Claims),
            "EMPLOYER" => Ok(Self::Employer),
            _ => Err(ComposeCoreError::UnknownAudience(raw.to_string())),
        }
    }
}

impl FromStr for Audience {
    type Err = ComposeCoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
