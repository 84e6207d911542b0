//! Membership form value types and validation rules.

use std::str::FromStr;

use clubgate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Minimum accepted length for a member name.
pub const NAME_MIN_LENGTH: usize = 2;

/// Maximum accepted length for a member name.
pub const NAME_MAX_LENGTH: usize = 50;

/// Validated member name.
///
/// Accepts letters, spaces, hyphens, and apostrophes only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberName(String);

impl MemberName {
    /// Creates a validated member name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.len() < NAME_MIN_LENGTH || trimmed.len() > NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "name must be between {NAME_MIN_LENGTH} and {NAME_MAX_LENGTH} characters"
            )));
        }

        let allowed = trimmed
            .chars()
            .all(|character| character.is_ascii_alphabetic() || matches!(character, ' ' | '-' | '\''));
        if !allowed {
            return Err(AppError::Validation(
                "name may only contain letters, spaces, hyphens, and apostrophes".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the validated name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MemberName> for String {
    fn from(value: MemberName) -> Self {
        value.0
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

/// Scheme prefixes that disqualify an address outright.
const FORBIDDEN_EMAIL_FRAGMENTS: &[&str] = &["javascript:", "vbscript:", "data:", "<script"];

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`,
    /// and the address carries no script-scheme fragments.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        if FORBIDDEN_EMAIL_FRAGMENTS
            .iter()
            .any(|fragment| trimmed.contains(fragment))
        {
            return Err(AppError::Validation(
                "email address contains a forbidden sequence".to_owned(),
            ));
        }

        let parts: Vec<&str> = trimmed.splitn(2, '@').collect();
        if parts.len() != 2 {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        let local = parts[0];
        let domain = parts[1];

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') || domain.contains('@') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Academic year selected on the membership form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassYear {
    /// First-year student.
    Freshman,
    /// Second-year student.
    Sophomore,
    /// Third-year student.
    Junior,
    /// Fourth-year student.
    Senior,
    /// Graduate student.
    Graduate,
}

impl ClassYear {
    /// Returns the stable form value for this year.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freshman => "freshman",
            Self::Sophomore => "sophomore",
            Self::Junior => "junior",
            Self::Senior => "senior",
            Self::Graduate => "graduate",
        }
    }

    /// Returns all selectable years.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ClassYear] = &[
            ClassYear::Freshman,
            ClassYear::Sophomore,
            ClassYear::Junior,
            ClassYear::Senior,
            ClassYear::Graduate,
        ];

        ALL
    }
}

impl FromStr for ClassYear {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "freshman" => Ok(Self::Freshman),
            "sophomore" => Ok(Self::Sophomore),
            "junior" => Ok(Self::Junior),
            "senior" => Ok(Self::Senior),
            "graduate" => Ok(Self::Graduate),
            _ => Err(AppError::Validation("invalid year selection".to_owned())),
        }
    }
}

/// A fully validated membership application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipApplication {
    name: MemberName,
    email: EmailAddress,
    year: ClassYear,
}

impl MembershipApplication {
    /// Creates an application from validated parts.
    #[must_use]
    pub fn new(name: MemberName, email: EmailAddress, year: ClassYear) -> Self {
        Self { name, email, year }
    }

    /// Returns the applicant's name.
    #[must_use]
    pub fn name(&self) -> &MemberName {
        &self.name
    }

    /// Returns the applicant's email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the applicant's academic year.
    #[must_use]
    pub fn year(&self) -> ClassYear {
        self.year
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{ClassYear, EmailAddress, MemberName};

    #[test]
    fn member_name_accepts_letters_and_punctuation() {
        assert!(MemberName::new("Mary-Jane O'Neil").is_ok());
    }

    #[test]
    fn member_name_rejects_digits_and_symbols() {
        assert!(MemberName::new("robert; drop tables").is_err());
        assert!(MemberName::new("x").is_err());
        assert!(MemberName::new("a".repeat(51)).is_err());
    }

    #[test]
    fn email_requires_single_at_and_dotted_domain() {
        assert!(EmailAddress::new("alice@example.com").is_ok());
        assert!(EmailAddress::new("alice@example").is_err());
        assert!(EmailAddress::new("alice.example.com").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
    }

    #[test]
    fn email_rejects_script_schemes() {
        assert!(EmailAddress::new("javascript:alert(1)@example.com").is_err());
        assert!(EmailAddress::new("a<script>@example.com").is_err());
    }

    #[test]
    fn email_is_normalized_to_lowercase() {
        let email = EmailAddress::new(" Alice@Example.COM ");
        assert!(email.is_ok());
        assert_eq!(
            email.map(|value| value.as_str().to_owned()).ok(),
            Some("alice@example.com".to_owned())
        );
    }

    #[test]
    fn class_year_round_trips_through_form_values() {
        for year in ClassYear::all() {
            assert_eq!(ClassYear::from_str(year.as_str()).ok(), Some(*year));
        }
        assert!(ClassYear::from_str("sophmore").is_err());
    }
}
