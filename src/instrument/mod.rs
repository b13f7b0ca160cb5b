//! # Instrument Module
//!
//! This module provides instrument-specific configuration.
//!
//! ## Modules
//!
//! - [`config`]: ScopeMeter link parameters and screen geometry

pub mod config;

pub use config::InstrumentConfig;
