pub mod analyze;
pub mod bulk;
pub mod config;
pub mod series;
