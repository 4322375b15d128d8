use time::{Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::plans::dto::{Category, CreatePlanRequest, Difficulty, DurationUnit};
use crate::plans::repo::{Plan, Subscription};
use crate::state::AppState;

/// Validated field set for a plan write.
#[derive(Debug)]
pub struct NewPlan {
    pub title: String,
    pub description: String,
    pub full_content: String,
    pub price: f64,
    pub duration: i32,
    pub duration_unit: DurationUnit,
    pub category: Category,
    pub difficulty: Difficulty,
}

/// Checks required fields, value ranges and the closed enums, applying the
/// model defaults for omitted enum fields.
pub fn validate_new_plan(req: CreatePlanRequest) -> Result<NewPlan, ApiError> {
    let title = req
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Title is required"))?;
    let description = req
        .description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Description is required"))?;
    let full_content = req
        .full_content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Full content is required"))?;
    let price = req
        .price
        .ok_or_else(|| ApiError::validation("Price is required"))?;
    if !(price >= 0.0) {
        return Err(ApiError::validation("Price must be zero or positive"));
    }
    let duration = req
        .duration
        .ok_or_else(|| ApiError::validation("Duration is required"))?;
    if duration < 1 {
        return Err(ApiError::validation("Duration must be at least 1"));
    }

    let duration_unit = parse_duration_unit(req.duration_unit.as_deref())?;
    let category = parse_category(req.category.as_deref())?;
    let difficulty = parse_difficulty(req.difficulty.as_deref())?;

    Ok(NewPlan {
        title: title.trim().to_string(),
        description,
        full_content,
        price,
        duration,
        duration_unit,
        category,
        difficulty,
    })
}

pub fn parse_duration_unit(s: Option<&str>) -> Result<DurationUnit, ApiError> {
    match s {
        None => Ok(DurationUnit::Days),
        Some(v) => DurationUnit::parse(v)
            .ok_or_else(|| ApiError::validation(format!("Invalid duration unit: {v}"))),
    }
}

pub fn parse_category(s: Option<&str>) -> Result<Category, ApiError> {
    match s {
        None => Ok(Category::Custom),
        Some(v) => {
            Category::parse(v).ok_or_else(|| ApiError::validation(format!("Invalid category: {v}")))
        }
    }
}

pub fn parse_difficulty(s: Option<&str>) -> Result<Difficulty, ApiError> {
    match s {
        None => Ok(Difficulty::Beginner),
        Some(v) => Difficulty::parse(v)
            .ok_or_else(|| ApiError::validation(format!("Invalid difficulty: {v}"))),
    }
}

/// Expiry for a new subscription. The plan's `duration` is added as a day
/// count whatever `duration_unit` says; a 30-month plan expires after 30
/// days. See the regression test below before changing this.
pub fn subscription_expiry(subscribed_at: OffsetDateTime, duration: i32) -> OffsetDateTime {
    subscribed_at + Duration::days(i64::from(duration))
}

/// Maps the outcome of the subscription insert. `None` means a row for the
/// (user, plan) pair already existed, so the insert changed nothing; that
/// surfaces as the already-subscribed rejection. Repeated calls never renew
/// or extend the existing record.
pub fn subscription_outcome(inserted: Option<Subscription>) -> Result<Subscription, ApiError> {
    inserted.ok_or_else(|| ApiError::validation("Already subscribed to this plan"))
}

/// Creates a subscription for `user_id` on `plan_id`. Fails when the plan
/// does not exist or the user is already subscribed; a second identical call
/// is rejected rather than renewed.
pub async fn subscribe(
    state: &AppState,
    user_id: Uuid,
    plan_id: Uuid,
) -> Result<Subscription, ApiError> {
    let plan = Plan::find_by_id(&state.db, plan_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan not found"))?;

    let now = OffsetDateTime::now_utc();
    let expires_at = subscription_expiry(now, plan.duration);

    let inserted = Subscription::insert(&state.db, user_id, plan.id, now, expires_at).await?;
    let sub = subscription_outcome(inserted)?;
    info!(user_id = %user_id, plan_id = %plan.id, expires_at = %expires_at, "subscribed");
    Ok(sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn base_request() -> CreatePlanRequest {
        CreatePlanRequest {
            title: Some("Bulk 12".into()),
            description: Some("Twelve weeks of hypertrophy".into()),
            full_content: Some("Week 1: bench 5x5...".into()),
            price: Some(49.0),
            duration: Some(84),
            duration_unit: Some("weeks".into()),
            category: Some("muscle-gain".into()),
            difficulty: Some("advanced".into()),
        }
    }

    #[test]
    fn valid_request_passes() {
        let plan = validate_new_plan(base_request()).unwrap();
        assert_eq!(plan.duration_unit, DurationUnit::Weeks);
        assert_eq!(plan.category, Category::MuscleGain);
        assert_eq!(plan.difficulty, Difficulty::Advanced);
    }

    #[test]
    fn missing_required_fields_rejected() {
        for strip in ["title", "description", "full_content", "price", "duration"] {
            let mut req = base_request();
            match strip {
                "title" => req.title = None,
                "description" => req.description = None,
                "full_content" => req.full_content = None,
                "price" => req.price = None,
                _ => req.duration = None,
            }
            assert!(validate_new_plan(req).is_err(), "{strip} should be required");
        }
    }

    #[test]
    fn negative_price_and_zero_duration_rejected() {
        let mut req = base_request();
        req.price = Some(-1.0);
        assert!(validate_new_plan(req).is_err());

        let mut req = base_request();
        req.duration = Some(0);
        assert!(validate_new_plan(req).is_err());
    }

    #[test]
    fn unknown_enum_values_rejected() {
        let mut req = base_request();
        req.category = Some("yoga".into());
        assert!(validate_new_plan(req).is_err());

        let mut req = base_request();
        req.duration_unit = Some("years".into());
        assert!(validate_new_plan(req).is_err());

        let mut req = base_request();
        req.difficulty = Some("pro".into());
        assert!(validate_new_plan(req).is_err());
    }

    #[test]
    fn omitted_enums_take_model_defaults() {
        let mut req = base_request();
        req.duration_unit = None;
        req.category = None;
        req.difficulty = None;
        let plan = validate_new_plan(req).unwrap();
        assert_eq!(plan.duration_unit, DurationUnit::Days);
        assert_eq!(plan.category, Category::Custom);
        assert_eq!(plan.difficulty, Difficulty::Beginner);
    }

    #[test]
    fn expiry_adds_duration_as_days() {
        let t = datetime!(2024-01-01 00:00:00 UTC);
        assert_eq!(
            subscription_expiry(t, 14),
            datetime!(2024-01-15 00:00:00 UTC)
        );
    }

    #[test]
    fn duplicate_subscribe_is_rejected_not_renewed() {
        let err = subscription_outcome(None).unwrap_err();
        match &err {
            ApiError::Validation(msg) => assert_eq!(msg, "Already subscribed to this plan"),
            other => panic!("expected validation error, got {other:?}"),
        }
        let resp = axum::response::IntoResponse::into_response(err);
        assert_eq!(resp.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn first_subscribe_returns_the_inserted_record() {
        let t = datetime!(2024-06-01 00:00:00 UTC);
        let sub = Subscription {
            user_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            subscribed_at: t,
            expires_at: subscription_expiry(t, 7),
        };
        let out = subscription_outcome(Some(sub.clone())).unwrap();
        assert_eq!(out.plan_id, sub.plan_id);
        assert_eq!(out.expires_at, datetime!(2024-06-08 00:00:00 UTC));
    }

    /// A plan declared in months still expires after `duration` days. This
    /// pins the shipped behavior; the unit field plays no part in expiry.
    #[test]
    fn expiry_ignores_duration_unit_months() {
        let t = datetime!(2024-01-01 00:00:00 UTC);
        // duration 30, unit "months": expiry is 30 days out, not 30 months
        assert_eq!(
            subscription_expiry(t, 30),
            datetime!(2024-01-31 00:00:00 UTC)
        );
    }
}
