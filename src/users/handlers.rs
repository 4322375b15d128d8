use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{repo::User, AuthUser},
    error::ApiError,
    state::AppState,
    users::{
        dto::{FeedResponse, FollowResponse, TrainerProfileResponse, TrainerPlanSummary},
        repo::{Follow, TrainerPlanRow},
        services,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/:id/follow", post(toggle_follow))
        .route("/users/feed", get(get_feed))
        .route("/users/trainer/:id", get(trainer_profile))
}

#[instrument(skip(state))]
pub async fn toggle_follow(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FollowResponse>, ApiError> {
    let following = services::toggle_follow(&state, user_id, id).await?;
    let message = if following {
        "Followed successfully"
    } else {
        "Unfollowed successfully"
    };
    Ok(Json(FollowResponse {
        message: message.into(),
        following,
    }))
}

/// Composed feed for the caller. Followed-trainer plans are returned at
/// preview level only; `fullContent` is reachable solely through the plan
/// detail endpoint's access check. The caller's own subscribed plans come
/// back in full, since access to those is already granted.
#[instrument(skip(state))]
pub async fn get_feed(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<FeedResponse>, ApiError> {
    let feed = services::compose_feed(&state, user_id).await?;
    Ok(Json(feed))
}

#[instrument(skip(state))]
pub async fn trainer_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TrainerProfileResponse>, ApiError> {
    let trainer = User::find_by_id(&state.db, id)
        .await?
        .filter(|u| u.is_trainer)
        .ok_or_else(|| ApiError::not_found("Trainer not found"))?;

    let plans = TrainerPlanRow::list_for_trainer(&state.db, trainer.id).await?;
    let followers = Follow::followers_count(&state.db, trainer.id).await?;
    let is_following = Follow::exists(&state.db, user_id, trainer.id).await?;
    let stats = services::compute_stats(&plans, followers);

    Ok(Json(TrainerProfileResponse {
        trainer: trainer.into(),
        plans: plans.into_iter().map(TrainerPlanSummary::from).collect(),
        is_following,
        stats,
    }))
}
