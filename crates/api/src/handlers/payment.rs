//! Stripe checkout, billing portal and webhook handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use covergen_billing::{
    parse_event, verify_signature, BillingAction, BillingError, CheckoutRequest, HostedSession,
    StripeClient,
};
use covergen_core::error::CoreError;
use covergen_core::plans::PlanType;
use covergen_db::models::subscription::UpsertSubscription;
use covergen_db::repositories::{SubscriptionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::users::load_user;
use crate::middleware::auth::AuthUser;
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub plan: PlanType,
}

#[derive(Debug, Serialize)]
pub struct WebhookReceipt {
    pub received: bool,
    pub event_type: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/payment/checkout
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CheckoutBody>,
) -> AppResult<Json<ApiResponse<HostedSession>>> {
    if !input.plan.is_paid() {
        return Err(CoreError::Validation("The free plan needs no checkout".into()).into());
    }
    let stripe = stripe_client(&state)?;
    let price_id = state.billing.price_for_plan(input.plan).ok_or_else(|| {
        BillingError::NotConfigured(format!("no Stripe price for the {} plan", input.plan))
    })?;

    let user = load_user(&state, &auth).await?;
    let session = stripe
        .create_checkout_session(&CheckoutRequest {
            user_id: user.id,
            email: &user.email,
            customer_id: user.stripe_customer_id.as_deref(),
            plan: input.plan,
            price_id,
            success_url: &state.billing.success_url,
            cancel_url: &state.billing.cancel_url,
        })
        .await?;

    Ok(ok(session))
}

/// POST /api/payment/portal
pub async fn portal(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<HostedSession>>> {
    let stripe = stripe_client(&state)?;
    let user = load_user(&state, &auth).await?;
    let customer_id = user.stripe_customer_id.as_deref().ok_or_else(|| {
        CoreError::Validation("No billing account yet; subscribe to a plan first".into())
    })?;

    let session = stripe
        .create_portal_session(customer_id, &state.billing.portal_return_url)
        .await?;
    Ok(ok(session))
}

/// POST /api/payment/webhook
///
/// Authenticated by the `Stripe-Signature` header over the raw body.
/// Event types we do not act on are acknowledged with 200.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<WebhookReceipt>>> {
    let secret = state
        .billing
        .webhook_secret
        .as_deref()
        .ok_or_else(|| BillingError::NotConfigured("STRIPE_WEBHOOK_SECRET is not set".into()))?;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".into()))?;

    verify_signature(
        &body,
        signature,
        secret,
        Utc::now().timestamp(),
        state.billing.webhook_tolerance_secs,
    )?;
    let event = parse_event(&body)?;
    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Stripe webhook received");

    let action = BillingAction::from_event(&event, &state.billing);
    apply_action(&state.pool, action).await?;

    Ok(ok(WebhookReceipt {
        received: true,
        event_type: event.event_type,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn stripe_client(state: &AppState) -> Result<&StripeClient, BillingError> {
    state
        .stripe
        .as_deref()
        .ok_or_else(|| BillingError::NotConfigured("STRIPE_SECRET_KEY is not set".into()))
}

/// Apply a webhook's effect to the users and subscriptions tables.
pub async fn apply_action(pool: &PgPool, action: BillingAction) -> Result<(), sqlx::Error> {
    match action {
        BillingAction::CheckoutCompleted {
            user_id,
            customer_id,
            subscription_id,
            plan,
        } => {
            let Some(user_id) = user_id else {
                tracing::warn!("Checkout completed without a client_reference_id");
                return Ok(());
            };
            if let Some(customer_id) = &customer_id {
                UserRepo::set_stripe_customer(pool, user_id, customer_id).await?;
            }
            if let Some(plan) = plan {
                SubscriptionRepo::upsert(
                    pool,
                    &UpsertSubscription {
                        user_id,
                        plan,
                        status: "active".into(),
                        stripe_subscription_id: subscription_id,
                        current_period_end: None,
                    },
                )
                .await?;
                tracing::info!(user_id, plan = %plan, "Subscription started");
            }
        }

        BillingAction::SubscriptionChanged {
            subscription_id,
            customer_id,
            status,
            plan,
            current_period_end,
        } => {
            let period_end = current_period_end.and_then(|t| DateTime::from_timestamp(t, 0));
            let updated = SubscriptionRepo::update_by_stripe_id(
                pool,
                &subscription_id,
                &status,
                plan,
                period_end,
            )
            .await?;
            if updated.is_some() {
                tracing::info!(subscription_id = %subscription_id, status = %status, "Subscription updated");
                return Ok(());
            }

            // Created before the checkout event arrived: attach by customer.
            let user = match &customer_id {
                Some(customer) => UserRepo::find_by_stripe_customer(pool, customer).await?,
                None => None,
            };
            match (user, plan) {
                (Some(user), Some(plan)) => {
                    SubscriptionRepo::upsert(
                        pool,
                        &UpsertSubscription {
                            user_id: user.id,
                            plan,
                            status,
                            stripe_subscription_id: Some(subscription_id),
                            current_period_end: period_end,
                        },
                    )
                    .await?;
                    tracing::info!(user_id = user.id, plan = %plan, "Subscription linked by customer");
                }
                _ => {
                    tracing::warn!(subscription_id = %subscription_id, "Subscription update for unknown subscription");
                }
            }
        }

        BillingAction::SubscriptionCanceled {
            subscription_id, ..
        } => {
            let updated =
                SubscriptionRepo::update_by_stripe_id(pool, &subscription_id, "canceled", None, None)
                    .await?;
            if updated.is_none() {
                tracing::warn!(subscription_id = %subscription_id, "Cancellation for unknown subscription");
            } else {
                tracing::info!(subscription_id = %subscription_id, "Subscription canceled");
            }
        }

        BillingAction::PaymentFailed {
            customer_id,
            subscription_id,
        } => {
            tracing::warn!(customer_id = ?customer_id, subscription_id = ?subscription_id, "Invoice payment failed");
            if let Some(subscription_id) = subscription_id {
                SubscriptionRepo::update_by_stripe_id(pool, &subscription_id, "past_due", None, None)
                    .await?;
            }
        }

        BillingAction::Ignored { event_type } => {
            tracing::debug!(event_type = %event_type, "Ignoring Stripe event");
        }
    }
    Ok(())
}
