//! Stripe billing: checkout and portal sessions, webhook verification and
//! the mapping from Stripe events to subscription changes.

pub mod client;
pub mod config;
pub mod webhook;

pub use client::{CheckoutRequest, HostedSession, StripeClient};
pub use config::BillingConfig;
pub use webhook::{parse_event, sign_payload, verify_signature, BillingAction, StripeEvent};

/// Errors from billing operations.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// Stripe keys or price ids are missing.
    #[error("Billing is not configured: {0}")]
    NotConfigured(String),

    #[error("Stripe request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Stripe answered with a non-2xx status.
    #[error("Stripe API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The `Stripe-Signature` header is missing, malformed, stale or wrong.
    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}
