use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::plans::dto::{PlanFull, PlanPreview};
use crate::users::repo::TrainerPlanRow;

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub message: String,
    pub following: bool,
}

/// Feed entry: a followed trainer's plan plus the caller's subscription flag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPlan {
    #[serde(flatten)]
    pub plan: PlanPreview,
    pub is_subscribed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub followed_plans: Vec<FeedPlan>,
    pub subscribed_plans: Vec<PlanFull>,
    pub following_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerPlanSummary {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub duration: i32,
    pub duration_unit: String,
    pub category: String,
    pub difficulty: String,
    pub created_at: OffsetDateTime,
    pub subscriber_count: i64,
}

impl From<TrainerPlanRow> for TrainerPlanSummary {
    fn from(r: TrainerPlanRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            price: r.price,
            duration: r.duration,
            duration_unit: r.duration_unit,
            category: r.category,
            difficulty: r.difficulty,
            created_at: r.created_at,
            subscriber_count: r.subscriber_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerStats {
    pub total_plans: usize,
    /// Sum of per-plan subscriber counts. A user subscribed to several of
    /// the trainer's plans is counted once per plan.
    pub total_subscribers: i64,
    pub followers: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerProfileResponse {
    pub trainer: PublicUser,
    pub plans: Vec<TrainerPlanSummary>,
    pub is_following: bool,
    pub stats: TrainerStats,
}
