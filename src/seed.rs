use crate::{
    config::AppConfig,
    error::AppError,
    models::NewUser,
    password::hash_password,
    policy::SUPER_ADMIN,
    repository::{RepoError, RepositoryState},
};

/// ensure_super_admin
///
/// Creates the bootstrap Super Admin from `SEED_ADMIN_EMAIL` / `SEED_ADMIN_PASSWORD`
/// if no account with that email exists yet. Idempotent: an existing account is left
/// untouched, including its password and role.
pub async fn ensure_super_admin(
    repo: &RepositoryState,
    config: &AppConfig,
) -> Result<(), AppError> {
    let Some(seed) = &config.seed_admin else {
        tracing::debug!("no seed admin configured");
        return Ok(());
    };

    if repo.find_user_by_email(&seed.email).await?.is_some() {
        tracing::info!(email = %seed.email, "seed admin already present");
        return Ok(());
    }

    let password_hash = hash_password(seed.password.clone()).await?;
    match repo
        .create_user(NewUser {
            email: seed.email.clone(),
            password_hash,
            role_id: SUPER_ADMIN,
        })
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, email = %user.email, "seed admin created");
            Ok(())
        }
        // Another instance won the race.
        Err(RepoError::UniqueViolation(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
