//! # Kupid Common Library
//!
//! Shared code for the Kupid gateway and client including:
//! - Error and result types
//! - Configuration loading (CLI → ENV → TOML → defaults)
//! - Proxy route table and upstream backend selection
//! - Wire payload types (user, preferences, invites, matches)
//! - Onboarding completeness rule and match ordering

pub mod api;
pub mod config;
pub mod error;
pub mod matches;
pub mod profile;
pub mod routes;

pub use error::{Error, Result};
pub use matches::{Match, MatchDetails, ScoreBreakdown};
pub use routes::{Backend, ProxyRoute};
