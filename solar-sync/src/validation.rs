//! Client-side form checks. A failing check keeps the submit control
//! disabled; nothing is sent.

use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const PHONE_DIGITS: usize = 12;
pub const OTP_DIGITS: usize = 6;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(value)
    }
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::Email)
    }
}

/// Empty is allowed (the field is optional); otherwise exactly twelve digits
pub fn phone(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || (value.len() == PHONE_DIGITS && value.chars().all(|c| c.is_ascii_digit())) {
        Ok(())
    } else {
        Err(ValidationError::PhoneDigits { expected: PHONE_DIGITS })
    }
}

pub fn new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort { min: MIN_PASSWORD_LEN });
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn otp(value: &str) -> Result<(), ValidationError> {
    if value.len() == OTP_DIGITS && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::Otp { expected: OTP_DIGITS })
    }
}

/// Case-insensitive membership check returning the canonical spelling
pub fn choice(
    field: &'static str,
    value: &str,
    allowed: &[&'static str],
) -> Result<&'static str, ValidationError> {
    allowed
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(value.trim()))
        .copied()
        .ok_or_else(|| ValidationError::Choice { field, value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords_need_length_and_confirmation() {
        assert_eq!(
            new_password("short", "short"),
            Err(ValidationError::PasswordTooShort { min: 8 })
        );
        assert_eq!(new_password("longenough", "longenougH"), Err(ValidationError::PasswordMismatch));
        assert!(new_password("longenough", "longenough").is_ok());
    }

    #[test]
    fn phone_is_optional_but_exact() {
        assert!(phone("").is_ok());
        assert!(phone("919876543210").is_ok());
        assert!(phone("98765").is_err());
        assert!(phone("91987654321x").is_err());
    }

    #[test]
    fn email_and_otp_shapes() {
        assert!(email("ops@sunfield.io").is_ok());
        assert!(email("ops@sunfield").is_err());
        assert!(email("two words@x.io").is_err());
        assert!(otp("123456").is_ok());
        assert!(otp("12345").is_err());
        assert!(otp("12a456").is_err());
    }

    #[test]
    fn choice_is_case_insensitive() {
        assert_eq!(choice("report_type", "weekly", &["Daily", "Weekly"]), Ok("Weekly"));
        assert!(choice("report_type", "hourly", &["Daily", "Weekly"]).is_err());
        assert_eq!(required("email", "   "), Err(ValidationError::Required("email")));
    }
}
