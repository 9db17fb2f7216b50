pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::ServiceConfig;

pub use adapters::{
    clock::{FixedClock, SystemClock},
    gateway::HttpStudentDirectory,
    sink::{DeviceSink, RecordingSink},
};
pub use app::{ClaimOutcome, ClaimService};
pub use crate::core::{
    dispatcher::PrintDispatcher, entitlement::MealWindowResolver, keyword::DailyKeyword,
    ticket::TicketEncoder,
};
pub use utils::error::{Result, ServiceError};
