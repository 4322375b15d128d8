use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Follow edge between a user and a trainer. One row per edge; both the
/// `following` and `followers` views are projections of this table, so the
/// two sides can never diverge.
pub struct Follow;

impl Follow {
    pub async fn exists(db: &PgPool, follower_id: Uuid, trainer_id: Uuid) -> anyhow::Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM follows WHERE follower_id = $1 AND trainer_id = $2",
        )
        .bind(follower_id)
        .bind(trainer_id)
        .fetch_optional(db)
        .await?;
        Ok(row.is_some())
    }

    pub async fn insert(db: &PgPool, follower_id: Uuid, trainer_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO follows (follower_id, trainer_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, trainer_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(trainer_id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn remove(db: &PgPool, follower_id: Uuid, trainer_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND trainer_id = $2")
            .bind(follower_id)
            .bind(trainer_id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Trainers the user follows.
    pub async fn following_ids(db: &PgPool, follower_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT trainer_id FROM follows WHERE follower_id = $1")
                .bind(follower_id)
                .fetch_all(db)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn followers_count(db: &PgPool, trainer_id: Uuid) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT count(*) FROM follows WHERE trainer_id = $1")
                .bind(trainer_id)
                .fetch_one(db)
                .await?;
        Ok(count)
    }
}

/// Plan row for a trainer profile, with its derived subscriber count.
#[derive(Debug, Clone, FromRow)]
pub struct TrainerPlanRow {
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

impl TrainerPlanRow {
    pub async fn list_for_trainer(
        db: &PgPool,
        trainer_id: Uuid,
    ) -> anyhow::Result<Vec<TrainerPlanRow>> {
        let rows = sqlx::query_as::<_, TrainerPlanRow>(
            r#"
            SELECT p.id, p.title, p.price, p.duration, p.duration_unit,
                   p.category, p.difficulty, p.created_at,
                   (SELECT count(*) FROM subscriptions s WHERE s.plan_id = p.id)
                       AS subscriber_count
            FROM plans p
            WHERE p.trainer_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(trainer_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
