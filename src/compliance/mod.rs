//! Compliance scoring over completed interventions: trade classification,
//! warranty and maintenance dates, a weighted health score per
//! professional and per property, and the punctuality rate.

mod classify;
mod records;
mod score;

pub use classify::*;
pub use records::*;
pub use score::*;

// ── Tests ──────────────────────────────────────────────────────────────────
