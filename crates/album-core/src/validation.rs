//! Field-level checks shared by the entity constructors.

use crate::error::ValidationError;

/// A string field is present when it is supplied and non-blank.
pub(crate) fn required_string(
    value: Option<String>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ValidationError::Missing(field)),
    }
}

pub(crate) fn required_i64(
    value: Option<i64>,
    field: &'static str,
) -> Result<i64, ValidationError> {
    value.ok_or(ValidationError::Missing(field))
}

pub(crate) fn required_positive(
    value: Option<i64>,
    field: &'static str,
) -> Result<i64, ValidationError> {
    let v = required_i64(value, field)?;
    if v < 1 {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_count_as_missing() {
        assert_eq!(
            required_string(None, "name"),
            Err(ValidationError::Missing("name"))
        );
        assert_eq!(
            required_string(Some(String::new()), "name"),
            Err(ValidationError::Missing("name"))
        );
        assert_eq!(
            required_string(Some("   ".to_string()), "name"),
            Err(ValidationError::Missing("name"))
        );
        assert_eq!(required_string(Some("ok".to_string()), "name").unwrap(), "ok");
    }

    #[test]
    fn positive_ids() {
        assert_eq!(
            required_positive(None, "from"),
            Err(ValidationError::Missing("from"))
        );
        assert_eq!(
            required_positive(Some(0), "from"),
            Err(ValidationError::NotPositive("from"))
        );
        assert_eq!(
            required_positive(Some(-3), "from"),
            Err(ValidationError::NotPositive("from"))
        );
        assert_eq!(required_positive(Some(1), "from").unwrap(), 1);
    }
}
