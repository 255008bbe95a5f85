pub mod launcher;
pub mod report;
pub mod system;

pub use launcher::{LaunchOutcome, LaunchPlan, LaunchStep};
pub use report::export_customer_report;
pub use system::{build_source, Clock, RecommendationSystem};
