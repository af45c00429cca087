pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod output;
pub mod range;
pub mod session;
pub mod stats;
