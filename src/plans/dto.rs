use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::plans::repo::{PlanWithTrainer, Subscription};

/// Unit a plan's duration is expressed in. Closed set; anything else is
/// rejected at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Days,
    Weeks,
    Months,
}

impl DurationUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "days" => Some(Self::Days),
            "weeks" => Some(Self::Weeks),
            "months" => Some(Self::Months),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    FatLoss,
    MuscleGain,
    Beginner,
    Advanced,
    Custom,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fat-loss" => Some(Self::FatLoss),
            "muscle-gain" => Some(Self::MuscleGain),
            "beginner" => Some(Self::Beginner),
            "advanced" => Some(Self::Advanced),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FatLoss => "fat-loss",
            Self::MuscleGain => "muscle-gain",
            Self::Beginner => "beginner",
            Self::Advanced => "advanced",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// Reduced trainer representation embedded in plan responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
}

/// Preview projection: what non-subscribed, non-owner viewers see. Never
/// carries `fullContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPreview {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub duration: i32,
    pub duration_unit: String,
    pub category: String,
    pub difficulty: String,
    pub trainer: TrainerSummary,
    pub created_at: OffsetDateTime,
}

/// Full plan entity, visible to the owning trainer and subscribers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFull {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub full_content: String,
    pub price: f64,
    pub duration: i32,
    pub duration_unit: String,
    pub category: String,
    pub difficulty: String,
    pub trainer: TrainerSummary,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Response for a single-plan read, shaped by the access policy.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlanView {
    Full {
        #[serde(flatten)]
        plan: PlanFull,
        #[serde(rename = "hasAccess")]
        has_access: bool,
    },
    Preview {
        #[serde(flatten)]
        plan: PlanPreview,
        #[serde(rename = "hasAccess")]
        has_access: bool,
        message: String,
    },
}

impl From<PlanWithTrainer> for PlanPreview {
    fn from(p: PlanWithTrainer) -> Self {
        Self {
            id: p.id,
            title: p.title,
            price: p.price,
            duration: p.duration,
            duration_unit: p.duration_unit,
            category: p.category,
            difficulty: p.difficulty,
            trainer: TrainerSummary {
                id: p.trainer_id,
                name: p.trainer_name,
                email: p.trainer_email,
                bio: p.trainer_bio,
            },
            created_at: p.created_at,
        }
    }
}

impl From<PlanWithTrainer> for PlanFull {
    fn from(p: PlanWithTrainer) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            full_content: p.full_content,
            price: p.price,
            duration: p.duration,
            duration_unit: p.duration_unit,
            category: p.category,
            difficulty: p.difficulty,
            trainer: TrainerSummary {
                id: p.trainer_id,
                name: p.trainer_name,
                email: p.trainer_email,
                bio: p.trainer_bio,
            },
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub full_content: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i32>,
    pub duration_unit: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub full_content: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i32>,
    pub duration_unit: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub plan_id: Uuid,
    pub subscribed_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl From<Subscription> for SubscriptionRecord {
    fn from(s: Subscription) -> Self {
        Self {
            plan_id: s.plan_id,
            subscribed_at: s.subscribed_at,
            expires_at: s.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub message: String,
    pub subscription: SubscriptionRecord,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> PlanWithTrainer {
        PlanWithTrainer {
            id: Uuid::new_v4(),
            trainer_id: Uuid::new_v4(),
            title: "Shred 30".into(),
            description: "Thirty days of conditioning".into(),
            full_content: "Day 1: squats...".into(),
            price: 29.99,
            duration: 30,
            duration_unit: "days".into(),
            category: "fat-loss".into(),
            difficulty: "intermediate".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            trainer_name: "Coach".into(),
            trainer_email: "coach@example.com".into(),
            trainer_bio: None,
        }
    }

    #[test]
    fn preview_never_serializes_full_content() {
        let view = PlanView::Preview {
            plan: sample_row().into(),
            has_access: false,
            message: "Subscribe to view full content".into(),
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("fullContent"));
        assert!(!json.contains("Day 1"));
        assert!(json.contains("\"hasAccess\":false"));
        assert!(json.contains("durationUnit"));
    }

    #[test]
    fn full_view_carries_content_and_access_flag() {
        let view = PlanView::Full {
            plan: sample_row().into(),
            has_access: true,
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"fullContent\":\"Day 1: squats...\""));
        assert!(json.contains("\"hasAccess\":true"));
    }

    #[test]
    fn duration_unit_closed_set() {
        assert_eq!(DurationUnit::parse("weeks"), Some(DurationUnit::Weeks));
        assert_eq!(DurationUnit::parse("fortnights"), None);
        assert_eq!(DurationUnit::Months.as_str(), "months");
    }

    #[test]
    fn category_closed_set() {
        assert_eq!(Category::parse("fat-loss"), Some(Category::FatLoss));
        assert_eq!(Category::parse("muscle-gain"), Some(Category::MuscleGain));
        assert_eq!(Category::parse("cardio"), None);
    }

    #[test]
    fn difficulty_closed_set() {
        assert_eq!(Difficulty::parse("advanced"), Some(Difficulty::Advanced));
        assert_eq!(Difficulty::parse("expert"), None);
    }
}
