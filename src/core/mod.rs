pub mod access;
pub mod dispatcher;
pub mod entitlement;
pub mod keyword;
pub mod ticket;

pub use crate::domain::model::{
    DecisionReason, EntitlementDecision, MealPlanKind, PrinterCommandStream, Service, Student,
    TicketContent, TimeWindow,
};
pub use crate::domain::ports::{Clock, PrintSink, StudentDirectory};
pub use crate::utils::error::Result;
