//! Demo accounts created at startup.

use blueprint_db::models::user::CreateUser;
use blueprint_db::{Repositories, StoreError};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};

/// Password of every demo account.
pub const DEMO_PASSWORD: &str = "123456";

/// `(first name, last name, email, company)`
const DEMO_USERS: &[(&str, &str, &str, &str)] = &[
    ("Jone", "Doe", "info@codedthemes.com", "CodedThemes"),
    ("Phoenix", "Coded", "info@phoenixcoded.co", "PhoenixCoded"),
];

/// Register the demo accounts. Accounts that already exist are left alone.
pub async fn seed_demo_users(repos: &Repositories) -> AppResult<usize> {
    let mut created = 0;
    for (first_name, last_name, email, company) in DEMO_USERS {
        let password_hash = hash_password(DEMO_PASSWORD)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
        let input = CreateUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            company: Some(company.to_string()),
            password_hash,
        };
        match repos.users.create(&input).await {
            Ok(_) => created += 1,
            Err(StoreError::Conflict(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    tracing::info!(created, "Demo users seeded");
    Ok(created)
}
