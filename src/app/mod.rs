pub mod claim;

pub use claim::{ClaimOutcome, ClaimService, CodeClaim, PrintedTicket, ServiceStatus};
