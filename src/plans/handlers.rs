use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{repo::User, AuthUser},
    error::ApiError,
    plans::{
        access::can_view_full_content,
        dto::{
            CreatePlanRequest, DeletedResponse, PlanPreview, PlanView, SubscribeResponse,
            UpdatePlanRequest,
        },
        repo::{Plan, PlanWithTrainer, Subscription},
        services,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/plans/:id", get(get_plan))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", post(create_plan))
        .route("/plans/:id", put(update_plan).delete(delete_plan))
        .route("/plans/:id/subscribe", post(subscribe))
}

/// Public catalogue: preview fields plus trainer summary, no gated content.
#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlanPreview>>, ApiError> {
    let plans = PlanWithTrainer::list(&state.db).await?;
    Ok(Json(plans.into_iter().map(PlanPreview::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanView>, ApiError> {
    let plan = PlanWithTrainer::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan not found"))?;

    let subscriber_ids = Subscription::subscriber_ids(&state.db, plan.id).await?;
    let view = if can_view_full_content(user_id, plan.trainer_id, &subscriber_ids) {
        PlanView::Full {
            plan: plan.into(),
            has_access: true,
        }
    } else {
        PlanView::Preview {
            plan: plan.into(),
            has_access: false,
            message: "Subscribe to view full content".into(),
        }
    };
    Ok(Json(view))
}

async fn require_trainer(state: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;
    if !user.is_trainer {
        return Err(ApiError::forbidden("Not authorized"));
    }
    Ok(user)
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<Plan>), ApiError> {
    let trainer = require_trainer(&state, user_id).await?;
    let new_plan = services::validate_new_plan(payload)?;

    let plan = Plan::create(
        &state.db,
        trainer.id,
        &new_plan.title,
        &new_plan.description,
        &new_plan.full_content,
        new_plan.price,
        new_plan.duration,
        new_plan.duration_unit.as_str(),
        new_plan.category.as_str(),
        new_plan.difficulty.as_str(),
    )
    .await?;

    info!(plan_id = %plan.id, trainer_id = %trainer.id, "plan created");
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn owned_plan(state: &AppState, plan_id: Uuid, user_id: Uuid) -> Result<Plan, ApiError> {
    let plan = Plan::find_by_id(&state.db, plan_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan not found"))?;
    if plan.trainer_id != user_id {
        return Err(ApiError::forbidden("Not authorized"));
    }
    Ok(plan)
}

#[instrument(skip(state, payload))]
pub async fn update_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlanRequest>,
) -> Result<Json<Plan>, ApiError> {
    require_trainer(&state, user_id).await?;
    let plan = owned_plan(&state, id, user_id).await?;

    if let Some(price) = payload.price {
        if !(price >= 0.0) {
            return Err(ApiError::validation("Price must be zero or positive"));
        }
    }
    if let Some(duration) = payload.duration {
        if duration < 1 {
            return Err(ApiError::validation("Duration must be at least 1"));
        }
    }
    let duration_unit = payload
        .duration_unit
        .as_deref()
        .map(|v| services::parse_duration_unit(Some(v)))
        .transpose()?;
    let category = payload
        .category
        .as_deref()
        .map(|v| services::parse_category(Some(v)))
        .transpose()?;
    let difficulty = payload
        .difficulty
        .as_deref()
        .map(|v| services::parse_difficulty(Some(v)))
        .transpose()?;

    let updated = Plan::update(
        &state.db,
        plan.id,
        payload.title.as_deref(),
        payload.description.as_deref(),
        payload.full_content.as_deref(),
        payload.price,
        payload.duration,
        duration_unit.map(|u| u.as_str()),
        category.map(|c| c.as_str()),
        difficulty.map(|d| d.as_str()),
    )
    .await?;

    info!(plan_id = %updated.id, "plan updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require_trainer(&state, user_id).await?;
    let plan = owned_plan(&state, id, user_id).await?;

    let removed = Plan::delete_cascade(&state.db, plan.id).await?;
    info!(plan_id = %plan.id, subscriptions_removed = removed, "plan deleted");

    Ok(Json(DeletedResponse {
        message: "Plan removed".into(),
    }))
}

#[instrument(skip(state))]
pub async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let subscription = services::subscribe(&state, user_id, id).await?;
    Ok(Json(SubscribeResponse {
        message: "Successfully subscribed to plan".into(),
        subscription: subscription.into(),
    }))
}
