//! Command-line front end for the overtime tax calculator.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod report;
