//! API module for shared HTTP API functionality
//!
//! Provides the wire payloads exchanged between the client, the gateway and
//! the upstream workflows, plus session token helpers.
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared types
//!
//! The gateway and client wrap these with framework-specific code (Axum, reqwest).

pub mod auth;
pub mod types;

pub use auth::{bearer_token, cookie_value, cookie_with_suffix, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
pub use types::{
    is_truthy, missing_keys, CheckOnboardingResponse, DocumentLookup, GetUserRequest,
    InviteRequest, NewUser, PreferencesUpdate, SearchMatchesRequest, SearchMatchesResponse,
};
