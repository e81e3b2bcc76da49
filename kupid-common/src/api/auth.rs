//! Session token helpers
//!
//! The browser holds a Supabase session either as an `Authorization: Bearer`
//! header or as cookies set by the gateway's OAuth callback.

/// Cookie carrying the Supabase access token
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Cookie carrying the Supabase refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// The scheme match is case-insensitive. Returns `None` for other schemes or
/// an empty token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Look up a cookie by exact name in a `Cookie` header value
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    cookie_pairs(header)
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Look up the first cookie whose name ends with `suffix`
///
/// Supabase prefixes its cookies with the project ref
/// (`sb-<ref>-auth-token-code-verifier`), so callers match on the suffix.
pub fn cookie_with_suffix<'a>(header: &'a str, suffix: &str) -> Option<&'a str> {
    cookie_pairs(header)
        .find(|(key, _)| key.ends_with(suffix))
        .map(|(_, value)| value)
}

fn cookie_pairs(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header.split(';').filter_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        Some((key.trim(), value.trim().trim_matches('"')))
    })
}
