//! Ordered phase ladders and relative phase insertion

use thiserror::Error;

/// Well-known phase names shared by the built-in ladders
pub mod names {
    // Inbound
    pub const RECEIVE: &str = "receive";
    pub const PRE_STREAM: &str = "pre-stream";
    pub const STREAM: &str = "stream";
    pub const PRE_PROTOCOL: &str = "pre-protocol";
    pub const PROTOCOL: &str = "protocol";
    pub const READ: &str = "read";
    pub const PRE_UNMARSHAL: &str = "pre-unmarshal";
    pub const UNMARSHAL: &str = "unmarshal";
    pub const PRE_LOGICAL: &str = "pre-logical";
    pub const LOGICAL: &str = "logical";
    pub const POST_LOGICAL: &str = "post-logical";
    pub const PRE_INVOKE: &str = "pre-invoke";
    pub const INVOKE: &str = "invoke";
    pub const POST_INVOKE: &str = "post-invoke";

    // Outbound
    pub const SETUP: &str = "setup";
    pub const PREPARE: &str = "prepare";
    pub const PRE_MARSHAL: &str = "pre-marshal";
    pub const MARSHAL: &str = "marshal";
    pub const POST_MARSHAL: &str = "post-marshal";
    pub const WRITE: &str = "write";
    pub const SEND: &str = "send";
}

/// Spacing between consecutive phase priorities, leaving room for
/// callers that order on the raw key
const PRIORITY_STEP: u32 = 1000;

/// A named, totally-ordered processing stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    name: String,
    priority: u32,
}

impl Phase {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordering key within the owning registry
    pub fn priority(&self) -> u32 {
        self.priority
    }
}

/// Phase configuration errors, raised at registry-build time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("unknown phase '{anchor}' referenced when inserting '{phase}'")]
    UnknownAnchor { phase: String, anchor: String },

    #[error("phase '{phase}' is already registered")]
    DuplicatePhase { phase: String },

    #[error("invalid phase entry '{phase}': {reason}")]
    InvalidEntry { phase: String, reason: String },

    #[error("failed to read phase configuration: {0}")]
    ConfigRead(String),

    #[error("failed to parse phase configuration: {0}")]
    ConfigParse(String),
}

/// The canonical ordered list of phases for one pipeline direction
///
/// Built once at startup. Priorities are renumbered after every
/// insertion so the ordering key always reflects list position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseRegistry {
    phases: Vec<Phase>,
}

impl PhaseRegistry {
    /// Ladder for messages arriving from a transport
    pub fn inbound() -> Self {
        Self::from_names([
            names::RECEIVE,
            names::PRE_STREAM,
            names::STREAM,
            names::PRE_PROTOCOL,
            names::PROTOCOL,
            names::READ,
            names::PRE_UNMARSHAL,
            names::UNMARSHAL,
            names::PRE_LOGICAL,
            names::LOGICAL,
            names::POST_LOGICAL,
            names::PRE_INVOKE,
            names::INVOKE,
            names::POST_INVOKE,
        ])
    }

    /// Ladder for messages being sent to a transport
    pub fn outbound() -> Self {
        Self::from_names([
            names::SETUP,
            names::PRE_LOGICAL,
            names::LOGICAL,
            names::POST_LOGICAL,
            names::PREPARE,
            names::PRE_MARSHAL,
            names::MARSHAL,
            names::POST_MARSHAL,
            names::PRE_PROTOCOL,
            names::PROTOCOL,
            names::PRE_STREAM,
            names::STREAM,
            names::WRITE,
            names::SEND,
        ])
    }

    /// Subset of the inbound ladder used when reading a received fault
    pub fn inbound_fault() -> Self {
        Self::from_names([
            names::RECEIVE,
            names::READ,
            names::UNMARSHAL,
            names::PRE_LOGICAL,
        ])
    }

    /// Subset of the outbound ladder used when serializing a fault
    pub fn outbound_fault() -> Self {
        Self::from_names([
            names::PREPARE,
            names::PRE_MARSHAL,
            names::MARSHAL,
            names::PROTOCOL,
            names::WRITE,
            names::SEND,
        ])
    }

    /// Build a registry from an explicit ordered name list
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self { phases: Vec::new() };
        for name in names {
            registry.phases.push(Phase {
                name: name.into(),
                priority: 0,
            });
        }
        registry.renumber();
        registry
    }

    /// Ordered phase listing, first executed first
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Position of a phase in the ladder
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.name == name)
    }

    /// Ordering key of a phase, if registered
    pub fn priority_of(&self, name: &str) -> Option<u32> {
        self.phases
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.priority)
    }

    /// Insert a custom phase immediately before an existing one
    pub fn insert_before(&mut self, phase: &str, anchor: &str) -> Result<(), PhaseError> {
        let index = self.anchor_index(phase, anchor)?;
        self.insert_at(phase, index)
    }

    /// Insert a custom phase immediately after an existing one
    pub fn insert_after(&mut self, phase: &str, anchor: &str) -> Result<(), PhaseError> {
        let index = self.anchor_index(phase, anchor)?;
        self.insert_at(phase, index + 1)
    }

    fn anchor_index(&self, phase: &str, anchor: &str) -> Result<usize, PhaseError> {
        if self.contains(phase) {
            return Err(PhaseError::DuplicatePhase {
                phase: phase.to_string(),
            });
        }
        self.index_of(anchor).ok_or_else(|| PhaseError::UnknownAnchor {
            phase: phase.to_string(),
            anchor: anchor.to_string(),
        })
    }

    fn insert_at(&mut self, phase: &str, index: usize) -> Result<(), PhaseError> {
        if phase.is_empty() {
            return Err(PhaseError::InvalidEntry {
                phase: phase.to_string(),
                reason: "phase name is empty".to_string(),
            });
        }
        self.phases.insert(
            index,
            Phase {
                name: phase.to_string(),
                priority: 0,
            },
        );
        self.renumber();
        Ok(())
    }

    fn renumber(&mut self) {
        for (i, p) in self.phases.iter_mut().enumerate() {
            p.priority = (i as u32 + 1) * PRIORITY_STEP;
        }
    }
}
