//! HTTP API handlers for kupid-gw

pub mod callback;
pub mod health;
pub mod onboarding;
pub mod proxy;

pub use callback::auth_callback;
pub use health::health_routes;
pub use onboarding::check_onboarding;
pub use proxy::{
    add_user, document_to_user, get_preferences, get_user, search_matches, send_invite,
    update_preferences, update_user,
};
