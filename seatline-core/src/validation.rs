use crate::{CoreError, CoreResult};

/// Characters never allowed in a display name.
const NAME_REJECT: &str = "!@#-$%^&*()_+=<>?,./:;\"{}[]|\\";

/// The special characters the password policy accepts (and requires one of).
const PASSWORD_SPECIALS: &str = "@$!%*?&";

pub fn validate_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::ValidationError(
            "name must not be empty".to_string(),
        ));
    }
    if name.chars().any(|c| NAME_REJECT.contains(c)) {
        return Err(CoreError::ValidationError(
            "name contains unsupported characters".to_string(),
        ));
    }
    Ok(())
}

/// Accepts `local@domain.tld`: ASCII local part, dotted domain, alphabetic
/// top-level domain of at least two characters.
pub fn validate_email(email: &str) -> CoreResult<()> {
    let invalid = || CoreError::ValidationError("invalid email address".to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || local
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || "._%+-".contains(c)))
    {
        return Err(invalid());
    }

    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty()
        || host
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || ".-".contains(c)))
    {
        return Err(invalid());
    }
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    Ok(())
}

/// At least 8 characters with an uppercase letter, a digit, and one special
/// character; the charset is restricted to alphanumerics plus the specials.
pub fn validate_password(password: &str) -> CoreResult<()> {
    let strong = password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));

    if !strong {
        return Err(CoreError::ValidationError(
            "password must be at least 8 characters and include an uppercase letter, a digit, and one of @$!%*?&".to_string(),
        ));
    }
    Ok(())
}
