//! kupid-client library - client-side flows of the Kupid front-end
//!
//! - [`onboarding`]: the multi-step profile wizard and its submission
//! - [`browser`]: the swipe-style match browser
//! - [`redirect`]: where a signed-in user lands
//! - [`api`]: typed access to the gateway's `/api/*` routes
//!
//! State machines are plain structs driven by explicit transitions; all I/O
//! goes through the [`api::KupidApi`] trait so flows can be exercised
//! against an in-memory implementation.

pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod redirect;
pub mod validation;

pub use api::{HttpApi, KupidApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
