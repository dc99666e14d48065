//! Compose deep links.
//!
//! The router hands the controller `{type?, value?}` parsed from
//! `compose(/:type)(/:value)`; [`DeepLink::resolve`] decides which entry
//! point that payload selects.

use serde::{Deserialize, Serialize};

use crate::compose_audience::Audience;
use crate::ComposeCoreError;

pub const COMPOSE_ROUTE_ROOT: &str = "compose";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
/// Deep-link payload carried by `COMPOSE_OPEN`.
pub struct DeepLink {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Entry point selected by a deep link.
pub enum DeepLinkResolution {
    /// Look the entity up by `value` and jump to entity resolution.
    Lookup { audience: Audience, value: String },
    /// Behave as if the user chose `audience` on the audience screen.
    Audience(Audience),
    /// No usable type: probe for a single entity.
    FastPath,
}

fn non_blank(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

impl DeepLink {
    pub fn audience(audience: Audience) -> Self {
        Self {
            kind: Some(audience.route_segment().to_string()),
            value: None,
        }
    }

    pub fn lookup(audience: Audience, value: impl Into<String>) -> Self {
        Self {
            kind: Some(audience.route_segment().to_string()),
            value: Some(value.into()),
        }
    }

    /// Parses `compose`, `compose/:type` or `compose/:type/:value`.
    ///
    /// A leading `#` or `/` and a trailing `/` are ignored. Returns `None` for
    /// any other route.
    pub fn parse_route(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_start_matches('#').trim_matches('/');
        let mut segments = trimmed.split('/');
        if segments.next()? != COMPOSE_ROUTE_ROOT {
            return None;
        }
        let rest = segments.collect::<Vec<_>>();
        if rest.len() > 2 || rest.iter().any(|segment| segment.trim().is_empty()) {
            return None;
        }
        Some(Self {
            kind: rest.first().map(|segment| segment.to_string()),
            value: rest.get(1).map(|segment| segment.to_string()),
        })
    }

    /// Formats the route the router shows once compose is open. A value is
    /// only included alongside a type.
    pub fn route_path(&self) -> String {
        let mut path = COMPOSE_ROUTE_ROOT.to_string();
        if let Some(kind) = non_blank(&self.kind) {
            path.push('/');
            path.push_str(kind);
            if let Some(value) = non_blank(&self.value) {
                path.push('/');
                path.push_str(value);
            }
        }
        path
    }

    pub fn resolve(&self) -> Result<DeepLinkResolution, ComposeCoreError> {
        let Some(kind) = non_blank(&self.kind) else {
            return Ok(DeepLinkResolution::FastPath);
        };
        let audience = Audience::parse(kind)?;
        Ok(match non_blank(&self.value) {
            Some(value) => DeepLinkResolution::Lookup {
                audience,
                value: value.to_string(),
            },
            None => DeepLinkResolution::Audience(audience),
        })
    }
}
