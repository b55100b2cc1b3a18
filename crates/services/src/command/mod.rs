//! # Command interpreter
//!
//! `parse` → role gate → action. The gate always runs before the action
//! touches storage; usage errors from the parser come first.

mod parser;

pub use parser::{parse, Command, ReservedCommand};

use std::sync::Arc;

use domains::{AppError, AuthContext, BoardRepo, PostId, Result, Role};
use tracing::{info, warn};

use crate::gate::authorize;
use crate::roles::{plan_change, Direction};

/// Human-readable result of a command that ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub message: String,
}

impl CommandOutcome {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub struct CommandService {
    repo: Arc<dyn BoardRepo>,
}

impl CommandService {
    pub fn new(repo: Arc<dyn BoardRepo>) -> Self {
        Self { repo }
    }

    /// Runs one command line on behalf of `ctx`.
    pub async fn execute(&self, ctx: &AuthContext, input: &str) -> Result<CommandOutcome> {
        let command = parse(input)?;

        if let Some(min) = command.required_role() {
            if let Err(denied) = authorize(ctx, min) {
                warn!(role = %ctx.role_name, command = input, "command denied");
                return Err(denied);
            }
        }

        let outcome = match command {
            Command::AddText { username, text } => self.add_text(&username, &text).await,
            Command::Delete { ids } => self.delete_by_ids(&ids).await,
            Command::Destroy { keyword } => self.destroy(&keyword).await,
            Command::DestroyByColor { color } => Err(AppError::NotImplemented(format!(
                "deleting by colour \"{color}\" is not implemented"
            ))),
            Command::Clear => self.clear().await,
            Command::ChangeRole {
                username,
                target,
                direction,
            } => self.change_role(ctx, &username, target, direction).await,
            Command::DisSelf => self.dis_self(ctx).await,
            Command::Reserved(reserved) => Err(not_implemented(reserved)),
        };

        match &outcome {
            Ok(done) => info!(role = %ctx.role_name, command = input, "{}", done.message),
            // Logged at error level when mapped to a response.
            Err(AppError::Storage(_)) => {}
            Err(e) => warn!(command = input, error = %e, "command rejected"),
        }
        outcome
    }

    async fn add_text(&self, username: &str, text: &str) -> Result<CommandOutcome> {
        let user = self
            .repo
            .find_user(username)
            .await?
            .ok_or_else(|| AppError::user_not_found(username))?;
        self.repo.set_additional_text(user.id, text).await?;
        Ok(CommandOutcome::new(format!(
            "added \"{text}\" to user \"{username}\""
        )))
    }

    /// Best effort: each id is tried on its own and missing ones are skipped.
    async fn delete_by_ids(&self, ids: &[PostId]) -> Result<CommandOutcome> {
        if ids.is_empty() {
            return Err(AppError::validation(
                "specify the post numbers to delete",
            ));
        }
        let mut deleted = 0;
        for id in ids {
            if self.repo.delete_post(*id).await? {
                deleted += 1;
            }
        }
        Ok(CommandOutcome::new(format!("deleted {deleted} post(s)")))
    }

    async fn destroy(&self, keyword: &str) -> Result<CommandOutcome> {
        if keyword.is_empty() {
            return Err(AppError::validation("specify a keyword to delete by"));
        }
        let deleted = self.repo.delete_posts_containing(keyword).await?;
        Ok(CommandOutcome::new(format!(
            "deleted {deleted} post(s) containing \"{keyword}\""
        )))
    }

    async fn clear(&self) -> Result<CommandOutcome> {
        self.repo
            .clear_posts()
            .await
            .map_err(|e| AppError::Storage(e.context("failed to delete all posts")))?;
        Ok(CommandOutcome::new(
            "deleted all posts and reset post numbering",
        ))
    }

    async fn change_role(
        &self,
        ctx: &AuthContext,
        username: &str,
        target: Role,
        direction: Direction,
    ) -> Result<CommandOutcome> {
        let user = self
            .repo
            .find_user(username)
            .await?
            .ok_or_else(|| AppError::user_not_found(username))?;

        let change = plan_change(user.role, target, direction, ctx.level())
            .map_err(|rejection| rejection.into_app_error(username))?;
        self.repo.set_role(user.id, change.to).await?;

        Ok(CommandOutcome::new(format!(
            "{} user \"{username}\": {change}",
            direction.verb()
        )))
    }

    /// Drops the caller to the lowest tier. The subject is the commander, so
    /// only the must-decrease rule applies.
    async fn dis_self(&self, ctx: &AuthContext) -> Result<CommandOutcome> {
        let username = ctx.username.as_deref().ok_or_else(|| {
            AppError::Unauthenticated("caller username is required for /disself".into())
        })?;
        let user = self
            .repo
            .find_user(username)
            .await?
            .ok_or_else(|| AppError::user_not_found(username))?;

        if user.role == Role::Base {
            return Err(AppError::validation(format!(
                "user \"{username}\" already holds {}",
                Role::Base
            )));
        }
        self.repo.set_role(user.id, Role::Base).await?;

        Ok(CommandOutcome::new(format!(
            "demoted user \"{username}\": {} -> {}",
            user.role,
            Role::Base
        )))
    }
}

fn not_implemented(reserved: ReservedCommand) -> AppError {
    let name = reserved.name();
    AppError::NotImplemented(match reserved.missing_feature() {
        Some(feature) => format!("/{name} is not implemented: requires {feature}"),
        None => format!("/{name} is not implemented"),
    })
}
