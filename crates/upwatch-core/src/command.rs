// ── Mutations ──
//
// Every write the dashboard can perform. Input is normalized here so the
// CLI and TUI share one set of rules.

use crate::error::CoreError;
use crate::model::SiteId;

const MISSING_SITE_FIELDS: &str = "enter both a name and a URL";

/// A mutation executed through [`Dashboard::execute`](crate::Dashboard::execute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddSite { name: String, url: String },
    DeleteSite { id: SiteId },
}

/// Outcome of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    SiteAdded { name: String },
    SiteDeleted { id: SiteId },
}

impl Command {
    /// Build an `AddSite` with trimmed fields. Both must be non-empty.
    ///
    /// The URL is passed through as typed; scheme handling is the server's job.
    pub fn add_site(name: &str, url: &str) -> Result<Self, CoreError> {
        Self::AddSite {
            name: name.to_owned(),
            url: url.to_owned(),
        }
        .normalized()
    }

    pub(crate) fn normalized(self) -> Result<Self, CoreError> {
        match self {
            Self::AddSite { name, url } => {
                let (name, url) = (name.trim(), url.trim());
                if name.is_empty() || url.is_empty() {
                    return Err(CoreError::ValidationFailed {
                        message: MISSING_SITE_FIELDS.into(),
                    });
                }
                Ok(Self::AddSite {
                    name: name.to_owned(),
                    url: url.to_owned(),
                })
            }
            cmd @ Self::DeleteSite { .. } => Ok(cmd),
        }
    }
}
