//! Test suite for livecount
//!
//! This module organizes all integration and property tests

#[cfg(feature = "ssr")]
pub mod integration;
