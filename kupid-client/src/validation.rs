//! Per-field checks for the onboarding wizard
//!
//! Each check returns the parsed value on success, or a
//! [`ClientError::Validation`] carrying the message shown to the user.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ClientError, ClientResult};

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2050;
pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 100;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()-]{6,}[0-9]$").expect("static regex should compile"));

fn invalid<T>(message: impl Into<String>) -> ClientResult<T> {
    Err(ClientError::Validation(message.into()))
}

pub fn required<'a>(value: &'a str, message: &str) -> ClientResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return invalid(message);
    }
    Ok(trimmed)
}

/// Four-digit year in 2000–2050
pub fn class_year(value: &str) -> ClientResult<i32> {
    const MESSAGE: &str = "Class year must be a 4-digit year between 2000 and 2050";
    parse_year(value.trim()).ok_or_else(|| ClientError::Validation(MESSAGE.to_string()))
}

fn parse_year(value: &str) -> Option<i32> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = value.parse().ok()?;
    (MIN_YEAR..=MAX_YEAR).contains(&year).then_some(year)
}

/// Whole number of years in 18–100
pub fn age(value: &str) -> ClientResult<u32> {
    parse_age(value.trim()).ok_or_else(|| ClientError::Validation("Age must be a number between 18 and 100".to_string()))
}

fn parse_age(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let age: u32 = value.parse().ok()?;
    (MIN_AGE..=MAX_AGE).contains(&age).then_some(age)
}

pub fn email(value: &str) -> ClientResult<&str> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return invalid("Please enter a valid email address");
    }
    Ok(value)
}

/// Phone number: digits with optional `+`, spaces, dashes, parentheses; 7–15 digits
pub fn phone(value: &str) -> ClientResult<&str> {
    let value = value.trim();
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !PHONE_RE.is_match(value) || !(7..=15).contains(&digits) {
        return invalid("Please enter a valid phone number");
    }
    Ok(value)
}

/// Email or phone, at least one; each validated when present
pub fn contact(email_value: &str, phone_value: &str) -> ClientResult<()> {
    let has_email = !email_value.trim().is_empty();
    let has_phone = !phone_value.trim().is_empty();
    if !has_email && !has_phone {
        return invalid("Please enter an email address or phone number");
    }
    if has_email {
        email(email_value)?;
    }
    if has_phone {
        phone(phone_value)?;
    }
    Ok(())
}

/// `"NN"` or `"NN-MM"` with 18 ≤ NN ≤ MM ≤ 100
pub fn age_range(value: &str) -> ClientResult<(u32, u32)> {
    const MESSAGE: &str = "Age preference must be an age (e.g. 22) or a range (e.g. 21-25) between 18 and 100";
    let value = value.trim();
    let parsed = match value.split_once('-') {
        Some((low, high)) => parse_age(low.trim()).zip(parse_age(high.trim())),
        None => parse_age(value).map(|age| (age, age)),
    };
    match parsed {
        Some((low, high)) if low <= high => Ok((low, high)),
        _ => invalid(MESSAGE),
    }
}

/// `"YYYY"` or `"YYYY-YYYY"` within 2000–2050
pub fn year_range(value: &str) -> ClientResult<(i32, i32)> {
    const MESSAGE: &str = "Class year preference must be a year (e.g. 2025) or a range (e.g. 2024-2026)";
    let value = value.trim();
    let parsed = match value.split_once('-') {
        Some((low, high)) => parse_year(low.trim()).zip(parse_year(high.trim())),
        None => parse_year(value).map(|year| (year, year)),
    };
    match parsed {
        Some((low, high)) if low <= high => Ok((low, high)),
        _ => invalid(MESSAGE),
    }
}

/// `value` must be one of `options`
pub fn choice<'a>(value: &'a str, options: &[&str], label: &str) -> ClientResult<&'a str> {
    if options.contains(&value) {
        Ok(value)
    } else {
        invalid(format!("Please select your {}", label))
    }
}
