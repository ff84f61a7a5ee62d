use crate::{
    auth::hash_password,
    error::AppResult,
    model::{
        CrudRepository, ModelManager,
        entity::{UserEntity, UserEntityCreateUpdate},
    },
    web::{AuthenticatedUser, UserRole},
};

/// Demo accounts created on startup when `app.seed_defaults` is set.
pub const DEFAULT_ACCOUNTS: [(&str, &str, &str, &str, UserRole); 3] = [
    ("admin@skillforge.com", "admin123", "System", "Administrator", UserRole::Admin),
    ("instructor@skillforge.com", "instructor123", "John", "Instructor", UserRole::Instructor),
    ("student@skillforge.com", "student123", "Jane", "Student", UserRole::Student),
];

/// Creates each default account whose email is not taken yet.
#[tracing::instrument(skip(mm))]
pub async fn seed_default_accounts(mm: &ModelManager) -> AppResult<()> {
    let admin = AuthenticatedUser::admin();

    for (email, password, first_name, last_name, role) in DEFAULT_ACCOUNTS {
        if UserEntity::find_by_email(mm, &admin, email).await?.is_some() {
            continue;
        }

        let data = UserEntityCreateUpdate {
            email: email.to_string(),
            password_hash: hash_password(password)?,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
        };

        match UserEntity::create(mm, &admin, data).await {
            Ok(user) => tracing::info!("seeded {} account {}", user.role(), user.email()),
            // a concurrent start may have inserted it first
            Err(e) if e.is_unique_violation() => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
