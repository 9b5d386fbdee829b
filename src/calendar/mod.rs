//! Calendar projection: turns availability rules, absence blocks and
//! bookings into day, week and month grids for the dashboard.
//!
//! Everything here is a pure function of its inputs. Cell classification
//! is a display concern only; overlapping bookings share a cell and are
//! never rejected here.

mod hours;
mod project;
mod types;

pub use hours::*;
pub use project::*;
pub use types::*;

// ── Tests ──────────────────────────────────────────────────────────────────
