use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const COMPOSE_CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_ENTITIES_TRIM_COUNT: usize = 10;
pub const DEFAULT_SUBSCRIBE_MODAL_WIDTH: u32 = 550;

fn compose_config_schema_version() -> u32 {
    COMPOSE_CONFIG_SCHEMA_VERSION
}

fn default_entities_trim_count() -> usize {
    DEFAULT_ENTITIES_TRIM_COUNT
}

fn default_subscribe_modal_width() -> u32 {
    DEFAULT_SUBSCRIBE_MODAL_WIDTH
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Compose workflow settings, loaded from a JSON file.
///
/// Every field has a default, so an empty object (or a missing file) yields
/// the production values.
pub struct ComposeConfig {
    #[serde(default = "compose_config_schema_version")]
    pub schema_version: u32,
    /// Candidate count above which entity selection shows a search box.
    #[serde(default = "default_entities_trim_count")]
    pub entities_trim_count: usize,
    #[serde(default)]
    pub entity_labels: EntityLabels,
    #[serde(default)]
    pub workpos: WorkposDirectory,
    #[serde(default = "default_subscribe_modal_width")]
    pub subscribe_modal_width: u32,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            schema_version: COMPOSE_CONFIG_SCHEMA_VERSION,
            entities_trim_count: DEFAULT_ENTITIES_TRIM_COUNT,
            entity_labels: EntityLabels::default(),
            workpos: WorkposDirectory::default(),
            subscribe_modal_width: DEFAULT_SUBSCRIBE_MODAL_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Human labels for each business data type.
pub struct EntityLabels {
    pub claim: String,
    pub account: String,
}

impl Default for EntityLabels {
    fn default() -> Self {
        Self {
            claim: "Claim".to_string(),
            account: "Account".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Department contact shown when the backend returns no named contact.
pub struct WorkposFallback {
    pub description: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Work-position business data: role descriptions and department fallbacks.
pub struct WorkposDirectory {
    pub claim_manager_description: String,
    pub account_manager_description: String,
    pub claims_fallback: WorkposFallback,
    pub employer_fallback: WorkposFallback,
    /// Replaces an employer contact phone reported as `"0"`.
    pub employer_default_phone: String,
}

impl Default for WorkposDirectory {
    fn default() -> Self {
        Self {
            claim_manager_description: "Claim Manager".to_string(),
            account_manager_description: "Account Manager".to_string(),
            claims_fallback: WorkposFallback {
                description: "L&I".to_string(),
                first_name: "Claims ".to_string(),
                last_name: "Administration".to_string(),
                phone_number: "800-547-8367".to_string(),
            },
            employer_fallback: WorkposFallback {
                description: "L&I".to_string(),
                first_name: "Employer".to_string(),
                last_name: "Services".to_string(),
                phone_number: "360-902-4817".to_string(),
            },
            employer_default_phone: "360-902-4817".to_string(),
        }
    }
}

pub fn parse_compose_config(raw: &str) -> Result<ComposeConfig> {
    let config = serde_json::from_str::<ComposeConfig>(raw)
        .context("failed to parse compose config: expected JSON object")?;
    validate_compose_config(&config)?;
    Ok(config)
}

pub fn validate_compose_config(config: &ComposeConfig) -> Result<()> {
    if config.schema_version != COMPOSE_CONFIG_SCHEMA_VERSION {
        bail!(
            "unsupported compose config schema_version {} (expected {})",
            config.schema_version,
            COMPOSE_CONFIG_SCHEMA_VERSION
        );
    }
    if config.entities_trim_count == 0 {
        bail!("compose config entities_trim_count must be greater than 0");
    }
    Ok(())
}

/// Loads the compose config, falling back to defaults when `path` is absent.
pub fn load_compose_config(path: &Path) -> Result<ComposeConfig> {
    if !path.exists() {
        return Ok(ComposeConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read compose config {}", path.display()))?;
    parse_compose_config(&raw)
        .with_context(|| format!("invalid compose config {}", path.display()))
}
