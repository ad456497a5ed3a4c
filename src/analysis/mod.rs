//! Database-free analytics over catalog rows.

pub mod clustering;
pub mod competitive;
pub mod forecast;
pub mod sentiment;
pub mod stats;
