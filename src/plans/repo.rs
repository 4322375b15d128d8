use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub title: String,
    pub description: String,
    pub full_content: String,
    pub price: f64,
    pub duration: i32,
    pub duration_unit: String,
    pub category: String,
    pub difficulty: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Plan joined with its owning trainer's summary columns.
#[derive(Debug, Clone, FromRow)]
pub struct PlanWithTrainer {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub title: String,
    pub description: String,
    pub full_content: String,
    pub price: f64,
    pub duration: i32,
    pub duration_unit: String,
    pub category: String,
    pub difficulty: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub trainer_name: String,
    pub trainer_email: String,
    pub trainer_bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub subscribed_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

const PLAN_WITH_TRAINER_COLS: &str = r#"
    p.id, p.trainer_id, p.title, p.description, p.full_content, p.price,
    p.duration, p.duration_unit, p.category, p.difficulty,
    p.created_at, p.updated_at,
    u.name AS trainer_name, u.email AS trainer_email, u.bio AS trainer_bio
"#;

impl Plan {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Plan>> {
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            SELECT id, trainer_id, title, description, full_content, price,
                   duration, duration_unit, category, difficulty,
                   created_at, updated_at
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(plan)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &PgPool,
        trainer_id: Uuid,
        title: &str,
        description: &str,
        full_content: &str,
        price: f64,
        duration: i32,
        duration_unit: &str,
        category: &str,
        difficulty: &str,
    ) -> anyhow::Result<Plan> {
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            INSERT INTO plans (trainer_id, title, description, full_content, price,
                               duration, duration_unit, category, difficulty)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, trainer_id, title, description, full_content, price,
                      duration, duration_unit, category, difficulty,
                      created_at, updated_at
            "#,
        )
        .bind(trainer_id)
        .bind(title)
        .bind(description)
        .bind(full_content)
        .bind(price)
        .bind(duration)
        .bind(duration_unit)
        .bind(category)
        .bind(difficulty)
        .fetch_one(db)
        .await?;
        Ok(plan)
    }

    /// Partial update of mutable fields. `trainer_id` is immutable after
    /// creation; `updated_at` is bumped on every call.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        full_content: Option<&str>,
        price: Option<f64>,
        duration: Option<i32>,
        duration_unit: Option<&str>,
        category: Option<&str>,
        difficulty: Option<&str>,
    ) -> anyhow::Result<Plan> {
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            UPDATE plans SET
                title         = COALESCE($2, title),
                description   = COALESCE($3, description),
                full_content  = COALESCE($4, full_content),
                price         = COALESCE($5, price),
                duration      = COALESCE($6, duration),
                duration_unit = COALESCE($7, duration_unit),
                category      = COALESCE($8, category),
                difficulty    = COALESCE($9, difficulty),
                updated_at    = now()
            WHERE id = $1
            RETURNING id, trainer_id, title, description, full_content, price,
                      duration, duration_unit, category, difficulty,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(full_content)
        .bind(price)
        .bind(duration)
        .bind(duration_unit)
        .bind(category)
        .bind(difficulty)
        .fetch_one(db)
        .await?;
        Ok(plan)
    }

    /// Deletes a plan together with every subscription referencing it, in
    /// one transaction so no half-cleaned state can be observed.
    pub async fn delete_cascade(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
        let mut tx = db.begin().await?;
        let removed = sqlx::query("DELETE FROM subscriptions WHERE plan_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM plans WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(removed)
    }
}

impl PlanWithTrainer {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<PlanWithTrainer>> {
        let rows = sqlx::query_as::<_, PlanWithTrainer>(&format!(
            r#"
            SELECT {PLAN_WITH_TRAINER_COLS}
            FROM plans p
            JOIN users u ON u.id = p.trainer_id
            ORDER BY p.created_at DESC
            "#
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<PlanWithTrainer>> {
        let row = sqlx::query_as::<_, PlanWithTrainer>(&format!(
            r#"
            SELECT {PLAN_WITH_TRAINER_COLS}
            FROM plans p
            JOIN users u ON u.id = p.trainer_id
            WHERE p.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Plans authored by trainers in `trainer_ids`, newest first.
    pub async fn list_by_trainers(
        db: &PgPool,
        trainer_ids: &[Uuid],
    ) -> anyhow::Result<Vec<PlanWithTrainer>> {
        let rows = sqlx::query_as::<_, PlanWithTrainer>(&format!(
            r#"
            SELECT {PLAN_WITH_TRAINER_COLS}
            FROM plans p
            JOIN users u ON u.id = p.trainer_id
            WHERE p.trainer_id = ANY($1)
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(trainer_ids)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Full plan documents for every plan the user is subscribed to.
    pub async fn list_subscribed(
        db: &PgPool,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<PlanWithTrainer>> {
        let rows = sqlx::query_as::<_, PlanWithTrainer>(&format!(
            r#"
            SELECT {PLAN_WITH_TRAINER_COLS}
            FROM plans p
            JOIN users u ON u.id = p.trainer_id
            JOIN subscriptions s ON s.plan_id = p.id
            WHERE s.user_id = $1
            ORDER BY s.subscribed_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

impl Subscription {
    /// Inserts a subscription. Returns `None` when the (user, plan) pair
    /// already exists; the primary key makes concurrent duplicates lose
    /// rather than double-insert.
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        plan_id: Uuid,
        subscribed_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<Option<Subscription>> {
        let row = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (user_id, plan_id, subscribed_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, plan_id) DO NOTHING
            RETURNING user_id, plan_id, subscribed_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(subscribed_at)
        .bind(expires_at)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// IDs of every user subscribed to the plan; the plan's subscriber set
    /// is derived from the subscriptions table, never stored separately.
    pub async fn subscriber_ids(db: &PgPool, plan_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT user_id FROM subscriptions WHERE plan_id = $1")
                .bind(plan_id)
                .fetch_all(db)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn plan_ids_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT plan_id FROM subscriptions WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(db)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
