//! Crossway avatar-controller simulation library
//!
//! This module exposes the headless simulation core for testing
//! and library use.

pub mod config;
pub mod game;
