pub mod absence;
pub mod availability;
pub mod booking;
pub mod enums;
pub mod filters;
pub mod profile;
pub mod proof;
pub mod service;

pub use absence::*;
pub use availability::*;
pub use booking::*;
pub use enums::*;
pub use filters::*;
pub use profile::*;
pub use proof::*;
pub use service::*;
