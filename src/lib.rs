//! Pricing decision support: revenue-lift projections, optimal-price search,
//! underpriced-customer detection over billing exports, and inflation-based
//! price corrections.
//!
//! Every calculator in [`analyzer`] is a synchronous pure function of its inputs.

pub mod analyzer;
pub mod config;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod runner;
pub mod source;
pub mod utils;
