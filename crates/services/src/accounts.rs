//! Account bootstrap used by the `seed` tool.

use domains::{BoardRepo, CredentialHasher, NewUser, Result, Role, User};
use tracing::info;

/// Makes sure `username` exists and holds the operator tier. Idempotent.
pub async fn ensure_operator(
    repo: &dyn BoardRepo,
    hasher: &dyn CredentialHasher,
    username: &str,
) -> Result<User> {
    let mut user = match repo.find_user(username).await? {
        Some(user) => user,
        None => {
            let user = repo
                .create_user(NewUser {
                    username: username.to_string(),
                    password_hash: hasher.placeholder_account_hash()?,
                    role: Role::Operator,
                })
                .await?;
            info!(username, user_id = user.id, "operator account created");
            user
        }
    };

    if user.role != Role::Operator {
        repo.set_role(user.id, Role::Operator).await?;
        info!(username, from = %user.role, "account promoted to operator");
        user.role = Role::Operator;
    }
    Ok(user)
}
