pub mod candidate;
pub mod config;
pub mod flow;
pub mod method;
pub mod report;
