use covergen_core::plans::PlanType;

/// Stripe configuration loaded from environment variables.
///
/// Billing is optional: without `STRIPE_SECRET_KEY` the payment endpoints
/// answer with a configuration error and everyone stays on the free plan.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    /// Stripe price id of the Pro plan.
    pub price_pro: Option<String>,
    /// Stripe price id of the Business plan.
    pub price_business: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub portal_return_url: String,
    pub api_base_url: String,
    /// Maximum accepted age of a webhook signature, in seconds.
    pub webhook_tolerance_secs: u64,
}

impl BillingConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                                   |
    /// |-----------------------------|-------------------------------------------|
    /// | `STRIPE_SECRET_KEY`         | --                                        |
    /// | `STRIPE_WEBHOOK_SECRET`     | --                                        |
    /// | `STRIPE_PRICE_PRO`          | --                                        |
    /// | `STRIPE_PRICE_BUSINESS`     | --                                        |
    /// | `STRIPE_SUCCESS_URL`        | `http://localhost:5173/billing/success`   |
    /// | `STRIPE_CANCEL_URL`         | `http://localhost:5173/pricing`           |
    /// | `STRIPE_PORTAL_RETURN_URL`  | `http://localhost:5173/account`           |
    /// | `STRIPE_API_BASE_URL`       | `https://api.stripe.com`                  |
    /// | `STRIPE_WEBHOOK_TOLERANCE_SECS` | `300`                                 |
    pub fn from_env() -> Self {
        let webhook_tolerance_secs: u64 = std::env::var("STRIPE_WEBHOOK_TOLERANCE_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("STRIPE_WEBHOOK_TOLERANCE_SECS must be a valid u64");

        Self {
            secret_key: non_empty_var("STRIPE_SECRET_KEY"),
            webhook_secret: non_empty_var("STRIPE_WEBHOOK_SECRET"),
            price_pro: non_empty_var("STRIPE_PRICE_PRO"),
            price_business: non_empty_var("STRIPE_PRICE_BUSINESS"),
            success_url: non_empty_var("STRIPE_SUCCESS_URL")
                .unwrap_or_else(|| "http://localhost:5173/billing/success".into()),
            cancel_url: non_empty_var("STRIPE_CANCEL_URL")
                .unwrap_or_else(|| "http://localhost:5173/pricing".into()),
            portal_return_url: non_empty_var("STRIPE_PORTAL_RETURN_URL")
                .unwrap_or_else(|| "http://localhost:5173/account".into()),
            api_base_url: non_empty_var("STRIPE_API_BASE_URL")
                .unwrap_or_else(|| "https://api.stripe.com".into()),
            webhook_tolerance_secs,
        }
    }

    /// Configuration with billing switched off.
    pub fn disabled() -> Self {
        Self {
            secret_key: None,
            webhook_secret: None,
            price_pro: None,
            price_business: None,
            success_url: "http://localhost:5173/billing/success".into(),
            cancel_url: "http://localhost:5173/pricing".into(),
            portal_return_url: "http://localhost:5173/account".into(),
            api_base_url: "https://api.stripe.com".into(),
            webhook_tolerance_secs: 300,
        }
    }

    /// Stripe price id sold for `plan`.
    pub fn price_for_plan(&self, plan: PlanType) -> Option<&str> {
        match plan {
            PlanType::Free => None,
            PlanType::Pro => self.price_pro.as_deref(),
            PlanType::Business => self.price_business.as_deref(),
        }
    }

    /// Plan a Stripe price id belongs to.
    pub fn plan_for_price(&self, price_id: &str) -> Option<PlanType> {
        if self.price_pro.as_deref() == Some(price_id) {
            Some(PlanType::Pro)
        } else if self.price_business.as_deref() == Some(price_id) {
            Some(PlanType::Business)
        } else {
            None
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
