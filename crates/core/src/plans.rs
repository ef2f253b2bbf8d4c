//! Subscription plans, their limits and quota checks.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Free,
    Pro,
    Business,
}

impl PlanType {
    /// Database / wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Business => "business",
        }
    }

    /// Parse from the database `plan` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "business" => Ok(Self::Business),
            other => Err(CoreError::Validation(format!(
                "Unknown plan '{other}'. Must be one of: free, pro, business"
            ))),
        }
    }

    pub fn limits(self) -> &'static PlanLimits {
        match self {
            Self::Free => &FREE,
            Self::Pro => &PRO,
            Self::Business => &BUSINESS,
        }
    }

    /// `true` for tiers that are sold through Stripe.
    pub fn is_paid(self) -> bool {
        !matches!(self, Self::Free)
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of what a plan allows.
#[derive(Debug, Clone, Serialize)]
pub struct PlanLimits {
    pub plan: PlanType,
    pub display_name: &'static str,
    /// Monthly price in US cents.
    pub price_cents: u32,
    pub monthly_covers: u32,
    pub max_platforms_per_request: usize,
    pub features: &'static [&'static str],
}

static FREE: PlanLimits = PlanLimits {
    plan: PlanType::Free,
    display_name: "Free",
    price_cents: 0,
    monthly_covers: 10,
    max_platforms_per_request: 2,
    features: &[
        "10 covers per month",
        "2 platforms per request",
        "Built-in and custom styles",
        "Background generation",
    ],
};

static PRO: PlanLimits = PlanLimits {
    plan: PlanType::Pro,
    display_name: "Pro",
    price_cents: 999,
    monthly_covers: 200,
    max_platforms_per_request: 6,
    features: &[
        "200 covers per month",
        "6 platforms per request",
        "Built-in and custom styles",
        "Background generation",
    ],
};

static BUSINESS: PlanLimits = PlanLimits {
    plan: PlanType::Business,
    display_name: "Business",
    price_cents: 2999,
    monthly_covers: 2000,
    max_platforms_per_request: 10,
    features: &[
        "2000 covers per month",
        "All platforms per request",
        "Built-in and custom styles",
        "Background generation",
        "Priority support",
    ],
};

/// All plans in ascending price order.
pub fn all_plans() -> [&'static PlanLimits; 3] {
    [&FREE, &PRO, &BUSINESS]
}

/// Usage period key for a timestamp, formatted `YYYY-MM`.
pub fn usage_period(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Check that `requested` more covers fit into the plan's monthly quota and
/// the per-request platform limit.
pub fn check_quota(plan: PlanType, used_this_period: u32, requested: usize) -> Result<(), CoreError> {
    let limits = plan.limits();
    if requested > limits.max_platforms_per_request {
        return Err(CoreError::QuotaExceeded(format!(
            "The {} plan allows at most {} platforms per request",
            limits.display_name, limits.max_platforms_per_request
        )));
    }
    let remaining = limits.monthly_covers.saturating_sub(used_this_period);
    if requested as u64 > u64::from(remaining) {
        return Err(CoreError::QuotaExceeded(format!(
            "Monthly quota reached: {remaining} of {} covers remaining",
            limits.monthly_covers
        )));
    }
    Ok(())
}
