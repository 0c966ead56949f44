//! Common utilities for the Pinpoint selector toolkit.
//!
//! This crate provides shared infrastructure used by all Pinpoint components:
//! - **Warning System** - colored, de-duplicated terminal output for
//!   unsupported input (selector syntax, markup)

pub mod warning;
