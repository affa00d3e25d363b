pub mod aggregator;
pub mod model;
pub mod ordering;
pub mod state_machine;

pub use model::*;
pub use ordering::Submission;
