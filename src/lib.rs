//! picam-hq library crate.
//!
//! Drives a Raspberry Pi HQ camera through rpicam-apps: a live preview,
//! an interactive capture loop, and timestamped JPEGs on disk. The modules
//! are exposed for the binary and for integration testing.

pub mod camera;
pub mod cli;
pub mod config;
pub mod controller;
pub mod photo;
pub mod session;
pub mod signal;
