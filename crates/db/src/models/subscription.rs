//! Billing subscription model.

use covergen_core::plans::PlanType;
use covergen_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Statuses that still grant the paid plan.
pub const ENTITLED_STATUSES: &[&str] = &["active", "trialing", "past_due"];

/// Row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub plan: String,
    pub status: String,
    pub stripe_subscription_id: Option<String>,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// The plan the user is entitled to right now.
    ///
    /// Canceled or incomplete subscriptions fall back to `free`, as do
    /// rows with an unrecognized plan name.
    pub fn effective_plan(&self) -> PlanType {
        if !ENTITLED_STATUSES.contains(&self.status.as_str()) {
            return PlanType::Free;
        }
        PlanType::from_name(&self.plan).unwrap_or(PlanType::Free)
    }
}

/// DTO for creating or replacing a user's subscription.
#[derive(Debug, Deserialize)]
pub struct UpsertSubscription {
    pub user_id: DbId,
    pub plan: PlanType,
    pub status: String,
    pub stripe_subscription_id: Option<String>,
    pub current_period_end: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sub(plan: &str, status: &str) -> Subscription {
        Subscription {
            id: 1,
            user_id: 1,
            plan: plan.into(),
            status: status.into(),
            stripe_subscription_id: None,
            current_period_end: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn effective_plan_honours_status() {
        assert_eq!(sub("pro", "active").effective_plan(), PlanType::Pro);
        assert_eq!(sub("business", "past_due").effective_plan(), PlanType::Business);
        assert_eq!(sub("pro", "canceled").effective_plan(), PlanType::Free);
        assert_eq!(sub("pro", "incomplete").effective_plan(), PlanType::Free);
        assert_eq!(sub("platinum", "active").effective_plan(), PlanType::Free);
    }
}
