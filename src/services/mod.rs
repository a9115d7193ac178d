//! Business logic services.
//!
//! Services contain the core flows separated from HTTP handlers: lead
//! intake, the callback bridge, status reconciliation, and chat triage.

pub mod bridge;
pub mod callback;
pub mod leads;
pub mod reconcile;
pub mod triage;
