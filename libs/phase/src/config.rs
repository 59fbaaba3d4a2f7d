//! TOML-based phase extension configuration
//!
//! Lets a deployment declare extra phases without code changes:
//!
//! ```toml
//! [[phase]]
//! name = "audit"
//! after = "unmarshal"
//!
//! [[phase]]
//! name = "gate"
//! before = "send"
//! ```
//!
//! Entries are validated when loaded and applied in declaration order,
//! so a later entry may anchor on an earlier custom phase.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::registry::{PhaseError, PhaseRegistry};

/// Top-level phase configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PhaseConfig {
    /// Custom phase declarations, applied in order
    #[serde(default, rename = "phase")]
    pub phases: Vec<PhaseEntry>,
}

/// One custom phase with its relative position
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PhaseEntry {
    /// Name of the new phase
    pub name: String,

    /// Existing phase this one runs before
    pub before: Option<String>,

    /// Existing phase this one runs after
    pub after: Option<String>,
}

impl PhaseConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PhaseError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PhaseError::ConfigRead(e.to_string()))?;
        Self::from_toml_str(&raw)
    }

    /// Load and validate configuration from a TOML string
    pub fn from_toml_str(raw: &str) -> Result<Self, PhaseError> {
        let config: PhaseConfig =
            toml::from_str(raw).map_err(|e| PhaseError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every entry is well-formed
    ///
    /// Anchor existence is checked later by `apply`, against the
    /// registry the entries extend.
    pub fn validate(&self) -> Result<(), PhaseError> {
        for entry in &self.phases {
            if entry.name.is_empty() {
                return Err(PhaseError::InvalidEntry {
                    phase: entry.name.clone(),
                    reason: "phase name is empty".to_string(),
                });
            }
            match (&entry.before, &entry.after) {
                (Some(_), Some(_)) => {
                    return Err(PhaseError::InvalidEntry {
                        phase: entry.name.clone(),
                        reason: "declare either 'before' or 'after', not both".to_string(),
                    })
                }
                (None, None) => {
                    return Err(PhaseError::InvalidEntry {
                        phase: entry.name.clone(),
                        reason: "missing 'before' or 'after' anchor".to_string(),
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Extend a registry with the configured phases
    pub fn apply(&self, registry: &mut PhaseRegistry) -> Result<(), PhaseError> {
        for entry in &self.phases {
            match (&entry.before, &entry.after) {
                (Some(anchor), None) => registry.insert_before(&entry.name, anchor)?,
                (None, Some(anchor)) => registry.insert_after(&entry.name, anchor)?,
                // Rejected by validate()
                _ => {
                    return Err(PhaseError::InvalidEntry {
                        phase: entry.name.clone(),
                        reason: "exactly one anchor required".to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}
