//! Minimal Stripe REST client (form-encoded requests, JSON responses).

use covergen_core::plans::PlanType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::BillingConfig;
use crate::BillingError;

/// A Stripe-hosted page the user is redirected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedSession {
    pub id: String,
    pub url: String,
}

/// Parameters for a subscription checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    pub user_id: i64,
    pub email: &'a str,
    /// Existing Stripe customer, if the user already has one.
    pub customer_id: Option<&'a str>,
    pub plan: PlanType,
    pub price_id: &'a str,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

pub struct StripeClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(client: reqwest::Client, base_url: String, secret_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    /// Build a client from [`BillingConfig`], or fail if no secret key is set.
    pub fn from_config(config: &BillingConfig) -> Result<Self, BillingError> {
        let secret_key = config
            .secret_key
            .clone()
            .ok_or_else(|| BillingError::NotConfigured("STRIPE_SECRET_KEY is not set".into()))?;
        Ok(Self::new(
            reqwest::Client::new(),
            config.api_base_url.clone(),
            secret_key,
        ))
    }

    /// Create a Checkout Session in subscription mode.
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest<'_>,
    ) -> Result<HostedSession, BillingError> {
        let user_id = request.user_id.to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("mode", "subscription"),
            ("line_items[0][price]", request.price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", request.success_url),
            ("cancel_url", request.cancel_url),
            ("client_reference_id", user_id.as_str()),
            ("metadata[user_id]", user_id.as_str()),
            ("metadata[plan]", request.plan.as_str()),
            ("subscription_data[metadata][user_id]", user_id.as_str()),
            ("subscription_data[metadata][plan]", request.plan.as_str()),
        ];
        match request.customer_id {
            Some(customer) => form.push(("customer", customer)),
            None => form.push(("customer_email", request.email)),
        }

        let session = self.post_form("/v1/checkout/sessions", &form).await?;
        tracing::info!(
            user_id = request.user_id,
            plan = %request.plan,
            session_id = session["id"].as_str().unwrap_or_default(),
            "Stripe checkout session created",
        );
        hosted_session(&session)
    }

    /// Create a Billing Portal session for an existing customer.
    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<HostedSession, BillingError> {
        let form = [("customer", customer_id), ("return_url", return_url)];
        let session = self.post_form("/v1/billing_portal/sessions", &form).await?;
        hosted_session(&session)
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Value, BillingError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            return Err(BillingError::Api {
                status: status.as_u16(),
                message: body["error"]["message"]
                    .as_str()
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }
        Ok(body)
    }
}

fn hosted_session(body: &Value) -> Result<HostedSession, BillingError> {
    match (body["id"].as_str(), body["url"].as_str()) {
        (Some(id), Some(url)) => Ok(HostedSession {
            id: id.to_string(),
            url: url.to_string(),
        }),
        _ => Err(BillingError::Api {
            status: 200,
            message: "Stripe session response is missing id or url".into(),
        }),
    }
}
