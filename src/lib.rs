//! Generate prioritized QA test cases for a UI.
//!
//! Elements are read from a live page (headless browser) or from
//! screenshots (multimodal model), turned into a markdown table of test
//! cases by a generative model, parsed, and exported as an `.xlsx` workbook.
//!
//! The flow for one source is [`pipeline::runner::Pipeline::process`]; the
//! batch and single-URL runs in [`pipeline`] add archive handling and export.

pub mod browser;
pub mod cli;
pub mod export;
pub mod extract;
pub mod generator;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod table;
