// Kickstarter projects dashboard built on kickboard-core

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod dataset;

pub use config::KickstarterConfig;
pub use dashboard::{build_dashboard, update_counts, update_pledged, Widgets};
pub use dataset::{Dataset, DatasetError, Project, StateCounts};
