pub mod availability;
pub mod booking;
pub mod calendar;
pub mod compliance;
pub mod config;
pub mod db;
pub mod error;
pub mod legacy_notes;
pub mod models;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

use tracing_subscriber::EnvFilter;

pub use availability::{AvailabilityStore, SlotCheck, TimeSlot};
pub use booking::{BookingEvent, BookingLifecycle};
pub use calendar::{project, Grid};
pub use compliance::{ComplianceReport, ComplianceScorer};
pub use error::{AgendaError, SlotRejection};
pub use service::AgendaService;

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// built-in filter. Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    if result.is_ok() {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
