//! Utilities and Helper Functions
//!
//! This module contains utility functions and helper modules:
//! - Logging configuration and setup
//! - Whole-session test scenarios

pub mod logger;
