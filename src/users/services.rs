use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use crate::auth::repo::User;
use crate::error::ApiError;
use crate::plans::dto::PlanFull;
use crate::plans::repo::{PlanWithTrainer, Subscription};
use crate::state::AppState;
use crate::users::dto::{FeedPlan, FeedResponse, TrainerStats};
use crate::users::repo::{Follow, TrainerPlanRow};

/// Flips the follow edge between `follower_id` and a trainer. Returns the
/// resulting state: true if the caller now follows the trainer.
pub async fn toggle_follow(
    state: &AppState,
    follower_id: Uuid,
    trainer_id: Uuid,
) -> Result<bool, ApiError> {
    let trainer = User::find_by_id(&state.db, trainer_id)
        .await?
        .filter(|u| u.is_trainer)
        .ok_or_else(|| ApiError::not_found("Trainer not found"))?;

    if trainer.id == follower_id {
        return Err(ApiError::validation("Cannot follow yourself"));
    }

    let currently_following = Follow::exists(&state.db, follower_id, trainer.id).await?;
    if currently_following {
        Follow::remove(&state.db, follower_id, trainer.id).await?;
        info!(follower = %follower_id, trainer = %trainer.id, "unfollowed");
        Ok(false)
    } else {
        Follow::insert(&state.db, follower_id, trainer.id).await?;
        info!(follower = %follower_id, trainer = %trainer.id, "followed");
        Ok(true)
    }
}

/// Annotates followed-trainer plans with the caller's subscription flag,
/// preserving the incoming (newest-first) order.
pub fn mark_subscribed(plans: Vec<PlanWithTrainer>, subscribed: &HashSet<Uuid>) -> Vec<FeedPlan> {
    plans
        .into_iter()
        .map(|p| FeedPlan {
            is_subscribed: subscribed.contains(&p.id),
            plan: p.into(),
        })
        .collect()
}

/// Builds the personalized feed: plans from followed trainers (newest
/// first, flagged with the caller's subscription state), the caller's
/// subscribed plans in full, and the followed-trainer count. Recomputed on
/// every call; nothing is cached.
pub async fn compose_feed(state: &AppState, user_id: Uuid) -> Result<FeedResponse, ApiError> {
    let following = Follow::following_ids(&state.db, user_id).await?;

    let followed_plans = PlanWithTrainer::list_by_trainers(&state.db, &following).await?;
    let subscribed_ids: HashSet<Uuid> = Subscription::plan_ids_for_user(&state.db, user_id)
        .await?
        .into_iter()
        .collect();

    let subscribed_plans = PlanWithTrainer::list_subscribed(&state.db, user_id)
        .await?
        .into_iter()
        .map(PlanFull::from)
        .collect();

    Ok(FeedResponse {
        followed_plans: mark_subscribed(followed_plans, &subscribed_ids),
        subscribed_plans,
        following_count: following.len(),
    })
}

/// Aggregate metrics for a trainer profile. `total_subscribers` sums the
/// per-plan counts, so one user subscribed to several plans counts once per
/// plan.
pub fn compute_stats(plans: &[TrainerPlanRow], followers: i64) -> TrainerStats {
    TrainerStats {
        total_plans: plans.len(),
        total_subscribers: plans.iter().map(|p| p.subscriber_count).sum(),
        followers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn plan_row(id: Uuid, trainer_id: Uuid, created_at: OffsetDateTime) -> PlanWithTrainer {
        PlanWithTrainer {
            id,
            trainer_id,
            title: "plan".into(),
            description: "d".into(),
            full_content: "c".into(),
            price: 10.0,
            duration: 7,
            duration_unit: "days".into(),
            category: "custom".into(),
            difficulty: "beginner".into(),
            created_at,
            updated_at: created_at,
            trainer_name: "T".into(),
            trainer_email: "t@example.com".into(),
            trainer_bio: None,
        }
    }

    #[test]
    fn mark_subscribed_flags_only_subscribed_plans() {
        let trainer = Uuid::new_v4();
        let sub_plan = Uuid::new_v4();
        let other_plan = Uuid::new_v4();
        let now = OffsetDateTime::UNIX_EPOCH;

        let subscribed: HashSet<Uuid> = [sub_plan].into_iter().collect();
        let feed = mark_subscribed(
            vec![plan_row(sub_plan, trainer, now), plan_row(other_plan, trainer, now)],
            &subscribed,
        );

        assert_eq!(feed.len(), 2);
        assert!(feed[0].is_subscribed);
        assert!(!feed[1].is_subscribed);
    }

    #[test]
    fn mark_subscribed_preserves_newest_first_order() {
        let trainer = Uuid::new_v4();
        let newer = Uuid::new_v4();
        let older = Uuid::new_v4();
        let t1 = OffsetDateTime::UNIX_EPOCH + time::Duration::days(2);
        let t0 = OffsetDateTime::UNIX_EPOCH;

        let feed = mark_subscribed(
            vec![plan_row(newer, trainer, t1), plan_row(older, trainer, t0)],
            &HashSet::new(),
        );

        assert_eq!(feed[0].plan.id, newer);
        assert_eq!(feed[1].plan.id, older);
        assert!(feed[0].plan.created_at > feed[1].plan.created_at);
    }

    fn trainer_plan(count: i64) -> TrainerPlanRow {
        TrainerPlanRow {
            id: Uuid::new_v4(),
            title: "p".into(),
            price: 5.0,
            duration: 7,
            duration_unit: "days".into(),
            category: "custom".into(),
            difficulty: "beginner".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            subscriber_count: count,
        }
    }

    #[test]
    fn stats_sum_subscriber_counts_per_plan() {
        let plans = vec![trainer_plan(3), trainer_plan(0), trainer_plan(2)];
        let stats = compute_stats(&plans, 7);
        assert_eq!(stats.total_plans, 3);
        assert_eq!(stats.total_subscribers, 5);
        assert_eq!(stats.followers, 7);
    }

    #[test]
    fn stats_for_trainer_without_plans() {
        let stats = compute_stats(&[], 0);
        assert_eq!(stats.total_plans, 0);
        assert_eq!(stats.total_subscribers, 0);
        assert_eq!(stats.followers, 0);
    }
}
