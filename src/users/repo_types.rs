use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

pub const MIN_FIELD_CHARS: usize = 3;
pub const MAX_FIELD_CHARS: usize = 255;

/// User record as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String, // stored and returned as given
}

/// A problem with one field of a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: FieldProblem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldProblem {
    Missing,
    TooShort,
    TooLong,
}

/// Raised when a write carries a missing or out-of-bounds field. Lists every
/// offending field, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid user: {}", describe(.0))]
pub struct ValidationError(pub Vec<FieldError>);

impl ValidationError {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| match e.reason {
            FieldProblem::Missing => format!("{} is required", e.field),
            FieldProblem::TooShort => {
                format!("{} must be at least {MIN_FIELD_CHARS} characters", e.field)
            }
            FieldProblem::TooLong => {
                format!("{} must be at most {MAX_FIELD_CHARS} characters", e.field)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// The three writable fields, already checked against the length rules.
/// Only `NewUser::new` builds one, so every value reaching a store is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: String,
    password: String,
}

impl NewUser {
    pub fn new(
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();
        check("name", name.as_deref(), &mut errors);
        check("email", email.as_deref(), &mut errors);
        check("password", password.as_deref(), &mut errors);

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) if errors.is_empty() => Ok(Self {
                name,
                email,
                password,
            }),
            _ => Err(ValidationError(errors)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn into_user(self, id: Uuid) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
        }
    }
}

fn check(field: &'static str, value: Option<&str>, errors: &mut Vec<FieldError>) {
    let reason = match value.map(|v| v.chars().count()) {
        None => FieldProblem::Missing,
        Some(n) if n < MIN_FIELD_CHARS => FieldProblem::TooShort,
        Some(n) if n > MAX_FIELD_CHARS => FieldProblem::TooLong,
        Some(_) => return,
    };
    errors.push(FieldError { field, reason });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn accepts_fields_within_bounds() {
        let u = NewUser::new(some("Ann"), some("ann@x.com"), some("secret")).unwrap();
        assert_eq!(u.name(), "Ann");
        assert_eq!(u.email(), "ann@x.com");
        assert_eq!(u.password(), "secret");
    }

    #[test]
    fn boundaries_are_inclusive() {
        let max = "x".repeat(MAX_FIELD_CHARS);
        assert!(NewUser::new(some("abc"), some(&max), some("abc")).is_ok());
    }

    #[test]
    fn reports_every_bad_field() {
        let long = "x".repeat(MAX_FIELD_CHARS + 1);
        let err = NewUser::new(None, some("ab"), some(&long)).unwrap_err();
        assert_eq!(
            err.fields(),
            &[
                FieldError { field: "name", reason: FieldProblem::Missing },
                FieldError { field: "email", reason: FieldProblem::TooShort },
                FieldError { field: "password", reason: FieldProblem::TooLong },
            ]
        );
        let msg = err.to_string();
        assert!(msg.contains("name is required"));
        assert!(msg.contains("email must be at least 3 characters"));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // three characters, nine bytes
        assert!(NewUser::new(some("日本語"), some("a@b"), some("pwd")).is_ok());
        let long = "é".repeat(MAX_FIELD_CHARS);
        assert!(NewUser::new(some(&long), some("a@b"), some("pwd")).is_ok());
    }

    #[test]
    fn empty_string_is_too_short_not_missing() {
        let err = NewUser::new(some(""), some("a@b"), some("pwd")).unwrap_err();
        assert_eq!(err.fields()[0].reason, FieldProblem::TooShort);
    }
}
