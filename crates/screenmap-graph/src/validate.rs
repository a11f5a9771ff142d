use crate::node::{DeclarationSite, NodeKind};

/// A problem found while declaring the graph.
///
/// Construction never stops at the first problem: the offending declaration
/// is rejected, the diagnostic is recorded, and the remaining declarations
/// are still processed so every conflict surfaces together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("{kind} '{name}' at {site} conflicts with an identically named {existing_kind} at {existing_site}")]
    NameConflict {
        name: String,
        kind: NodeKind,
        site: DeclarationSite,
        existing_kind: NodeKind,
        existing_site: DeclarationSite,
    },

    #[error("Action '{name}' points to '{destination}' at {site}, but to '{existing_destination}' at {existing_site}")]
    DestinationConflict {
        name: String,
        destination: String,
        site: DeclarationSite,
        existing_destination: String,
        existing_site: DeclarationSite,
    },

    #[error("Action '{name}' heads a chain at {site}, but is already defined at {existing_site}")]
    DuplicateChainHead {
        name: String,
        site: DeclarationSite,
        existing_site: DeclarationSite,
    },

    #[error("Expected '{name}' to be a screen state (referenced at {site})")]
    NotAScreenState {
        name: String,
        site: DeclarationSite,
    },
}

impl ConstructionError {
    /// Every declaration site this diagnostic points at.
    pub fn sites(&self) -> Vec<DeclarationSite> {
        match self {
            ConstructionError::NameConflict {
                site,
                existing_site,
                ..
            }
            | ConstructionError::DestinationConflict {
                site,
                existing_site,
                ..
            }
            | ConstructionError::DuplicateChainHead {
                site,
                existing_site,
                ..
            } => vec![*existing_site, *site],
            ConstructionError::NotAScreenState { site, .. } => vec![*site],
        }
    }
}

/// Turn accumulated diagnostics into a single result.
pub fn check_diagnostics(diagnostics: &[ConstructionError]) -> Result<(), Vec<ConstructionError>> {
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics.to_vec())
    }
}
