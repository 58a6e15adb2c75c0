pub mod args;
pub mod error;
pub mod model;
pub mod notify;
pub mod search;
pub mod sources;
pub mod storage;

pub use error::CoreError;
pub use search::FederatedSearch;
pub use search::reconcile::{PollSummary, ReconcileOutcome, Reconciler};
