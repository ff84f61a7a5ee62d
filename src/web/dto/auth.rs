use serde::{Deserialize, Serialize};

use crate::{model::entity::UserEntity, web::UserRole};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Defaults to `STUDENT`. `ADMIN` is refused.
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserEntity,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl RegisterBody {
    /// Checks the fields a client can get wrong, returning the complaint.
    pub fn validate(&self) -> Result<UserRole, String> {
        if !normalize_email(&self.email).contains('@') {
            return Err(String::from("email is not valid"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }

        match self.role.unwrap_or(UserRole::Student) {
            UserRole::Admin => Err(String::from("administrator accounts cannot be self-registered")),
            role => Ok(role),
        }
    }
}
