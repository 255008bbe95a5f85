pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use adapters::LocalStorage;
pub use app::{LaunchOutcome, LaunchPlan, RecommendationSystem};
pub use config::AppConfig;
pub use core::recommendation::{Recommendation, RecommendationEngine, RecommendationSettings};
pub use utils::error::{RecsysError, Result};
