//! Command-line front end for the census standardization engine.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod render;
