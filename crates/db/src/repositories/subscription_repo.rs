//! Repository for the `subscriptions` table.

use covergen_core::plans::PlanType;
use covergen_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::subscription::{Subscription, UpsertSubscription};

const COLUMNS: &str = "id, user_id, plan, status, stripe_subscription_id, current_period_end, \
                       created_at, updated_at";

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_stripe_id(
        pool: &PgPool,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE stripe_subscription_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(stripe_subscription_id)
            .fetch_optional(pool)
            .await
    }

    /// Plan the user is currently entitled to; `free` without a subscription.
    pub async fn effective_plan(pool: &PgPool, user_id: DbId) -> Result<PlanType, sqlx::Error> {
        Ok(Self::find_by_user(pool, user_id)
            .await?
            .map(|s| s.effective_plan())
            .unwrap_or(PlanType::Free))
    }

    /// Create or replace the user's subscription row.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (user_id, plan, status, stripe_subscription_id, current_period_end)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id) DO UPDATE SET
                plan = EXCLUDED.plan,
                status = EXCLUDED.status,
                stripe_subscription_id = COALESCE(EXCLUDED.stripe_subscription_id, subscriptions.stripe_subscription_id),
                current_period_end = COALESCE(EXCLUDED.current_period_end, subscriptions.current_period_end)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.user_id)
            .bind(input.plan.as_str())
            .bind(&input.status)
            .bind(&input.stripe_subscription_id)
            .bind(input.current_period_end)
            .fetch_one(pool)
            .await
    }

    /// Update status (and optionally plan/period) by Stripe subscription id.
    ///
    /// Returns `None` if no subscription carries that id.
    pub async fn update_by_stripe_id(
        pool: &PgPool,
        stripe_subscription_id: &str,
        status: &str,
        plan: Option<PlanType>,
        current_period_end: Option<Timestamp>,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET
                status = $2,
                plan = COALESCE($3, plan),
                current_period_end = COALESCE($4, current_period_end)
             WHERE stripe_subscription_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(stripe_subscription_id)
            .bind(status)
            .bind(plan.map(PlanType::as_str))
            .bind(current_period_end)
            .fetch_optional(pool)
            .await
    }
}
