pub mod batch;
pub mod error;
pub mod runner;
pub mod single;
