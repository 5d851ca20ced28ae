use thiserror::Error;

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 100.0;
pub const MIN_SUBJECT_LENGTH: usize = 3;
pub const MAX_SUBJECT_LENGTH: usize = 50;
pub const MIN_TERM_LENGTH: usize = 3;
pub const MAX_TERM_LENGTH: usize = 50;
pub const MAX_ASSESSMENT_TYPE_LENGTH: usize = 50;

/// A user-correctable input problem. The `Display` text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} must be a number")]
    NotNumeric { field: &'static str, input: String },

    #[error("{field} cannot be less than {min}")]
    BelowMinimum { field: &'static str, min: f64 },

    #[error("{field} cannot be greater than {max}")]
    AboveMaximum { field: &'static str, max: f64 },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: &'static str, max: usize },
}

pub fn validate_grade(value: Option<f64>) -> Result<f64, ValidationError> {
    check_score("Grade", value)
}

pub fn validate_grade_text(text: &str) -> Result<f64, ValidationError> {
    parse_score("Grade", text)
}

pub fn validate_goal_target(value: Option<f64>) -> Result<f64, ValidationError> {
    check_score("Target grade", value)
}

pub fn validate_goal_target_text(text: &str) -> Result<f64, ValidationError> {
    parse_score("Target grade", text)
}

/// Returns the trimmed name on success.
pub fn validate_subject_name(text: &str) -> Result<String, ValidationError> {
    check_length("Subject name", text, MIN_SUBJECT_LENGTH, MAX_SUBJECT_LENGTH)
}

pub fn validate_term(text: &str) -> Result<String, ValidationError> {
    check_length("Term", text, MIN_TERM_LENGTH, MAX_TERM_LENGTH)
}

pub fn validate_assessment_type(text: &str) -> Result<String, ValidationError> {
    check_length("Assessment type", text, 1, MAX_ASSESSMENT_TYPE_LENGTH)
}

fn parse_score(field: &'static str, text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    // `f64::from_str` accepts "NaN" and "inf"; neither is a grade.
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => check_score(field, Some(value)),
        _ => Err(ValidationError::NotNumeric {
            field,
            input: trimmed.to_string(),
        }),
    }
}

fn check_score(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    match value {
        None => Err(ValidationError::Empty { field }),
        Some(v) if v.is_nan() => Err(ValidationError::NotNumeric {
            field,
            input: v.to_string(),
        }),
        Some(v) if v < MIN_GRADE => Err(ValidationError::BelowMinimum {
            field,
            min: MIN_GRADE,
        }),
        Some(v) if v > MAX_GRADE => Err(ValidationError::AboveMaximum {
            field,
            max: MAX_GRADE,
        }),
        Some(v) => Ok(v),
    }
}

fn check_length(
    field: &'static str,
    text: &str,
    min: usize,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    let length = trimmed.chars().count();

    if length == 0 {
        Err(ValidationError::Empty { field })
    } else if length < min {
        Err(ValidationError::TooShort { field, min })
    } else if length > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_bounds_are_inclusive() {
        assert_eq!(validate_grade(Some(0.0)), Ok(0.0));
        assert_eq!(validate_grade(Some(100.0)), Ok(100.0));
        assert_eq!(validate_grade(Some(72.5)), Ok(72.5));
        assert!(validate_grade(Some(-0.01)).is_err());
        assert!(validate_grade(Some(100.01)).is_err());
    }

    #[test]
    fn grade_failures_carry_specific_messages() {
        assert_eq!(
            validate_grade(None).unwrap_err().to_string(),
            "Grade cannot be empty"
        );
        assert_eq!(
            validate_grade(Some(-5.0)).unwrap_err().to_string(),
            "Grade cannot be less than 0"
        );
        assert_eq!(
            validate_grade(Some(101.0)).unwrap_err().to_string(),
            "Grade cannot be greater than 100"
        );
    }

    #[test]
    fn grade_text_must_parse() {
        assert_eq!(validate_grade_text(" 88.5 "), Ok(88.5));
        assert_eq!(
            validate_grade_text("abc").unwrap_err().to_string(),
            "Grade must be a number"
        );
        assert!(matches!(
            validate_grade_text("NaN"),
            Err(ValidationError::NotNumeric { .. })
        ));
        assert!(matches!(
            validate_grade_text("inf"),
            Err(ValidationError::NotNumeric { .. })
        ));
        assert_eq!(validate_grade_text("   "), Err(ValidationError::Empty { field: "Grade" }));
        assert!(matches!(
            validate_grade_text("150"),
            Err(ValidationError::AboveMaximum { .. })
        ));
    }

    #[test]
    fn goal_target_uses_grade_bounds() {
        assert_eq!(validate_goal_target(Some(85.0)), Ok(85.0));
        assert_eq!(
            validate_goal_target(Some(120.0)).unwrap_err().to_string(),
            "Target grade cannot be greater than 100"
        );
        assert_eq!(validate_goal_target_text("90"), Ok(90.0));
    }

    #[test]
    fn subject_name_length_is_measured_after_trimming() {
        assert_eq!(validate_subject_name("  Algebra "), Ok("Algebra".to_string()));
        assert_eq!(validate_subject_name("Art"), Ok("Art".to_string()));
        assert_eq!(
            validate_subject_name("  ab  ").unwrap_err().to_string(),
            "Subject name must be at least 3 characters"
        );
        assert_eq!(
            validate_subject_name("   ").unwrap_err().to_string(),
            "Subject name cannot be empty"
        );
        assert_eq!(
            validate_subject_name(&"x".repeat(51)).unwrap_err().to_string(),
            "Subject name cannot exceed 50 characters"
        );
        assert!(validate_subject_name(&"x".repeat(50)).is_ok());
    }

    #[test]
    fn term_follows_the_same_rules() {
        assert_eq!(validate_term("Fall 2024"), Ok("Fall 2024".to_string()));
        assert_eq!(
            validate_term("").unwrap_err().to_string(),
            "Term cannot be empty"
        );
        assert!(matches!(validate_term("F1"), Err(ValidationError::TooShort { .. })));
        assert!(matches!(
            validate_term(&"y".repeat(60)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(validate_subject_name("Ñoño").is_ok());
        assert!(validate_subject_name(&"é".repeat(50)).is_ok());
    }

    #[test]
    fn assessment_type_must_not_be_blank() {
        assert_eq!(validate_assessment_type(" Final "), Ok("Final".to_string()));
        assert_eq!(
            validate_assessment_type(" ").unwrap_err().to_string(),
            "Assessment type cannot be empty"
        );
    }
}
