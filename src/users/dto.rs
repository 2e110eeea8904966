use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo_types::{NewUser, ValidationError};

/// Body of create and update. Fields are optional here so that a missing field
/// surfaces as a validation error instead of a JSON rejection.
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<UserPayload> for NewUser {
    type Error = ValidationError;

    fn try_from(p: UserPayload) -> Result<Self, Self::Error> {
        NewUser::new(p.name, p.email, p.password)
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub id: Uuid,
}
