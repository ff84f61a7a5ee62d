use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::web::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub role: String,
    pub email: String,
    pub exp: i64,
}

impl UserClaims {
    pub fn new(user_id: Uuid, role: UserRole, email: &str, ttl: Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            role: role.to_string(),
            email: email.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.sub.parse().ok()
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, &claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<UserClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<UserClaims>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_round_trip_keeps_claims() {
        let id = Uuid::new_v4();
        let claims = UserClaims::new(id, UserRole::Instructor, "ada@skillforge.com", Duration::hours(1));
        let token = generate_token(claims, "secret").unwrap();

        let decoded = process_token(&token, "secret").unwrap().claims;
        assert_eq!(decoded.user_id(), Some(id));
        assert_eq!(decoded.role, "INSTRUCTOR");
        assert_eq!(decoded.email, "ada@skillforge.com");
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let claims = UserClaims::new(Uuid::new_v4(), UserRole::Student, "a@b.c", Duration::hours(1));
        let token = generate_token(claims, "secret").unwrap();

        assert!(process_token(&token, "another-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // default validation allows 60 seconds of leeway
        let claims = UserClaims::new(Uuid::new_v4(), UserRole::Student, "a@b.c", Duration::hours(-2));
        let token = generate_token(claims, "secret").unwrap();

        assert!(process_token(&token, "secret").is_err());
    }

    #[test]
    fn garbage_subject_has_no_user_id() {
        let claims = UserClaims {
            sub: "not-a-uuid".into(),
            role: "STUDENT".into(),
            email: String::new(),
            exp: 0,
        };
        assert_eq!(claims.user_id(), None);
    }
}
