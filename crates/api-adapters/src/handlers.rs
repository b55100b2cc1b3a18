//! # api-adapters Handlers
//!
//! This module coordinates the flow between HTTP requests and the services.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderName, StatusCode};
use axum::Json;
use domains::{AppError, AuthContext, PostId, PostView, RequestCredentials};
use serde::{Deserialize, Serialize};
use services::PostSubmission;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    pub password: Option<String>,
    pub parent_id: Option<PostId>,
}

#[derive(Debug, Serialize)]
pub struct CreatedPost {
    pub message: &'static str,
    pub post: PostView,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// The caller as resolved by the configured identity provider.
#[derive(Debug, Clone)]
pub struct Caller(pub AuthContext);

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = |name: &HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let credentials = RequestCredentials {
            role: header(&state.headers.role),
            username: header(&state.headers.user),
        };
        Ok(Caller(state.identity.authenticate(&credentials)?))
    }
}

/// `GET /posts`, newest first.
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostView>>, ApiError> {
    Ok(Json(state.posts.list().await?))
}

/// `POST /posts`
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedPost>), ApiError> {
    let Json(req) = payload?;
    let post = state
        .posts
        .submit(PostSubmission {
            name: req.name.unwrap_or_default(),
            content: req.content.unwrap_or_default(),
            password: req.password,
            parent_id: req.parent_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedPost {
            message: "post added",
            post,
        }),
    ))
}

/// `POST /command`
pub async fn run_command(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(req) = payload?;
    let Some(command) = req.command.filter(|c| !c.is_empty()) else {
        return Err(AppError::validation("missing command").into());
    };
    let outcome = state.commands.execute(&ctx, &command).await?;
    Ok(Json(MessageBody {
        message: outcome.message,
    }))
}
