use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compose_audience::Audience;
use crate::compose_config::{WorkposDirectory, WorkposFallback};
use crate::compose_serde::{lenient_optional_string, value_to_text};
use crate::compose_state::Workpos;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
/// Contact returned by a work-position lookup.
pub struct WorkposContact {
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub work_pos: Value,
}

impl WorkposContact {
    /// Contact with no name, used when the lookup failed.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn from_content(content: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(content)
    }

    fn has_no_name(&self) -> bool {
        let blank = |name: &Option<String>| name.as_deref().map(str::trim).unwrap_or("").is_empty();
        blank(&self.first_name) && blank(&self.last_name)
    }
}

/// Formats a ten-digit phone number as `ddd-ddd-dddd`; anything else is
/// returned trimmed.
pub fn format_phone_number(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits = trimmed
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    let only_formatting = trimmed
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | ' ' | '(' | ')' | '.'));
    if digits.len() == 10 && only_formatting {
        format!("{}-{}-{}", &digits[0..3], &digits[3..6], &digits[6..])
    } else {
        trimmed.to_string()
    }
}

fn apply_fallback(workpos: &mut Workpos, fallback: &WorkposFallback) {
    workpos.description = fallback.description.clone();
    workpos.first_name = fallback.first_name.clone();
    workpos.last_name = fallback.last_name.clone();
    workpos.phone_number = fallback.phone_number.clone();
}

/// Shapes a work-position contact into the editor's contact card.
///
/// A contact without a first or last name is replaced by the audience's
/// department fallback. `review` only applies to claims.
pub fn resolve_workpos(
    audience: Audience,
    contact: &WorkposContact,
    review: Option<&str>,
    directory: &WorkposDirectory,
) -> Workpos {
    let phone = contact.phone_number.clone().unwrap_or_default();
    let mut workpos = Workpos {
        first_name: contact.first_name.clone().unwrap_or_default(),
        last_name: contact.last_name.clone().unwrap_or_default(),
        phone_number: format_phone_number(&phone),
        description: String::new(),
        review: String::new(),
        work_pos: value_to_text(&contact.work_pos),
    };
    match audience {
        Audience::Claims => {
            workpos.description = directory.claim_manager_description.clone();
            workpos.review = review.unwrap_or_default().to_string();
            if contact.has_no_name() {
                apply_fallback(&mut workpos, &directory.claims_fallback);
            }
        }
        Audience::Employer => {
            workpos.description = directory.account_manager_description.clone();
            if phone.trim() == "0" {
                workpos.phone_number = directory.employer_default_phone.clone();
            }
            if contact.has_no_name() {
                apply_fallback(&mut workpos, &directory.employer_fallback);
            }
        }
        Audience::None => {}
    }
    workpos
}
