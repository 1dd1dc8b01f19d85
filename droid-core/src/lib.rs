//! Droid Core
//!
//! Core types shared by the Droid task agent and its clients.
//!
//! This crate contains:
//! - Domain types: job names, task settings, task results, runs, image metadata
//! - DTOs: request bodies sent to the notification services
//! - Names: well-known keys, paths and environment variable names

pub mod domain;
pub mod dto;
pub mod names;
