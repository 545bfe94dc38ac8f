// ── Domain model ──
//
// Canonical representation of what the monitoring server reports.
// Consumers (CLI/TUI) depend on these types, never on wire records.

pub mod site;
pub mod summary;
pub mod timestamp;

// ── Re-exports ──────────────────────────────────────────────────────

pub use site::{Site, SiteId, SiteStatus};
pub use summary::StatusSummary;
pub use timestamp::Timestamp;
