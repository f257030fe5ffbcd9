use anyhow::{Result, bail};

/// Maximum length of a stored object name.
const MAX_OBJECT_NAME_LEN: usize = 63;

/// Validate a stored object name.
/// Rules: lowercase `[a-z0-9-]`, max 63 chars, no leading/trailing hyphens.
pub fn validate_object_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("name must not be empty");
    }
    if name.len() > MAX_OBJECT_NAME_LEN {
        bail!(
            "name '{}' exceeds {} characters (got {})",
            name,
            MAX_OBJECT_NAME_LEN,
            name.len()
        );
    }
    if name.starts_with('-') || name.ends_with('-') {
        bail!("name '{}' must not start or end with a hyphen", name);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        bail!(
            "name '{}' must contain only lowercase letters, digits, and hyphens [a-z0-9-]",
            name
        );
    }
    Ok(())
}
