//! HTTP handlers for billing endpoints.
//!
//! These handlers connect axum routes to application layer command/query
//! handlers. Per the error handling policy, every failure is caught here:
//! API endpoints answer JSON error bodies, the browser callback always
//! answers a redirect, and the webhook endpoint maps `WebhookError` to the
//! status codes that drive the gateway's redelivery.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};

use crate::application::handlers::billing::{
    ConfirmCallbackCommand, ConfirmCallbackHandler, ExpireSubscriptionsHandler,
    GetPlanHandler, GetPlanQuery, HandleGatewayWebhookCommand, HandleGatewayWebhookHandler,
    OverridePlanCommand, OverridePlanHandler, StartCheckoutCommand, StartCheckoutHandler,
};
use crate::domain::billing::{BillingError, WebhookError, WebhookSignatureVerifier};
use crate::domain::foundation::UserId;
use crate::ports::{EmailSender, PaymentGateway, UserPlanRepository};

use super::dto::{
    CallbackQuery, CheckoutResponse, ErrorResponse, OverridePlanRequest, PlanResponse,
    PlanViewResponse, StartCheckoutRequest, SweepResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all billing dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct BillingAppState {
    pub plans: Arc<dyn UserPlanRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn EmailSender>,
    /// Webhook signing secret from the gateway dashboard.
    pub webhook_secret: String,
    /// Page the callback redirects to after a verified payment.
    pub success_redirect_url: String,
    /// Page the callback redirects to on any failure.
    pub failure_redirect_url: String,
    /// Default currency for checkouts.
    pub currency: String,
}

impl BillingAppState {
    /// Create handlers on demand from the shared state.
    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(self.gateway.clone())
    }

    pub fn confirm_callback_handler(&self) -> ConfirmCallbackHandler {
        ConfirmCallbackHandler::new(self.gateway.clone(), self.plans.clone())
    }

    pub fn webhook_handler(&self) -> HandleGatewayWebhookHandler {
        HandleGatewayWebhookHandler::new(
            WebhookSignatureVerifier::new(self.webhook_secret.clone()),
            self.plans.clone(),
        )
    }

    pub fn expiry_sweep_handler(&self) -> ExpireSubscriptionsHandler {
        ExpireSubscriptionsHandler::new(self.plans.clone(), self.mailer.clone())
    }

    pub fn get_plan_handler(&self) -> GetPlanHandler {
        GetPlanHandler::new(self.plans.clone())
    }

    pub fn override_plan_handler(&self) -> OverridePlanHandler {
        OverridePlanHandler::new(self.plans.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from the request.
///
/// In production, this would be extracted from JWT/session by auth
/// middleware. For now, uses a header-based extraction for
/// development/testing.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // In production, this would validate a JWT from the
            // Authorization header. For development, accept an X-User-Id
            // header.
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<UserId>().ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/billing/plan - Get the current user's plan
pub async fn get_plan(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.get_plan_handler();
    let result = handler
        .handle(GetPlanQuery {
            user_id: user.user_id,
        })
        .await?;

    let response = PlanResponse {
        plan: result.map(PlanViewResponse::from),
    };

    Ok(Json(response))
}

/// POST /api/billing/checkout - Start a subscription checkout
pub async fn create_checkout(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
    Json(request): Json<StartCheckoutRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.start_checkout_handler();
    let cmd = StartCheckoutCommand {
        user_id: user.user_id,
        email: request.email,
        amount_minor: request.amount,
        currency: state.currency.clone(),
        return_url: request.return_url,
    };

    let result = handler.handle(cmd).await?;

    let response = CheckoutResponse {
        order_reference: result.order_reference,
        checkout_url: result.checkout_url,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/billing/callback - Gateway browser redirect after payment
///
/// Always answers a redirect: to the success page when the transaction
/// verified and the plan was upgraded, to the failure page otherwise.
pub async fn payment_callback(
    State(state): State<BillingAppState>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    let handler = state.confirm_callback_handler();
    let cmd = ConfirmCallbackCommand {
        order_reference: query.order_reference,
        order_id: query.order_id,
    };

    match handler.handle(cmd).await {
        Ok(result) => {
            tracing::info!(user_id = %result.user_id, "Callback confirmed, redirecting to success page");
            Redirect::to(&state.success_redirect_url)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Callback failed, redirecting to failure page");
            Redirect::to(&state.failure_redirect_url)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Endpoint
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/gateway - Handle gateway webhook deliveries
pub async fn gateway_webhook(
    State(state): State<BillingAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get("X-Gateway-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookApiError(WebhookError::InvalidSignature))?;

    let handler = state.webhook_handler();
    let cmd = HandleGatewayWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    handler.handle(cmd).await?;

    Ok(StatusCode::OK)
}

// ════════════════════════════════════════════════════════════════════════════════
// Cron Endpoint
// ════════════════════════════════════════════════════════════════════════════════

/// GET /internal/cron/subscriptions - Run the subscription expiry sweep
///
/// Intended for invocation by an external scheduler. Idempotent; safe to
/// re-run (grace reminders are re-sent, downgrades are not repeated).
pub async fn run_expiry_sweep(
    State(state): State<BillingAppState>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.expiry_sweep_handler();
    let summary = handler
        .handle()
        .await
        .map_err(|e| BillingError::infrastructure(e.message))?;

    Ok(Json(SweepResponse::from(summary)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Admin Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/admin/plan - Override a user's plan (admin only)
pub async fn override_admin_plan(
    State(state): State<BillingAppState>,
    _user: AuthenticatedUser, // Would check admin role in production
    Json(request): Json<OverridePlanRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.override_plan_handler();
    let cmd = OverridePlanCommand {
        user_id: request.user_id,
        email: request.email,
        plan_type: request.plan_type,
        billing_cycle: request.billing_cycle,
        subscription_ends_at: request.subscription_ends_at,
    };

    let plan = handler.handle(cmd).await?;

    let response = PlanResponse {
        plan: Some(PlanViewResponse::from(plan)),
    };

    Ok(Json(response))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
#[derive(Debug)]
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self.0 {
            BillingError::PlanNotFound(_) => (StatusCode::NOT_FOUND, "PLAN_NOT_FOUND"),
            BillingError::InvalidOrderReference { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_ORDER_REFERENCE")
            }
            BillingError::TransactionNotFound(_) => {
                (StatusCode::PAYMENT_REQUIRED, "TRANSACTION_NOT_FOUND")
            }
            BillingError::PaymentNotCompleted { .. } => {
                (StatusCode::PAYMENT_REQUIRED, "PAYMENT_NOT_COMPLETED")
            }
            BillingError::GatewayFailure(_) => (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR"),
            BillingError::InvalidState { .. } => {
                (StatusCode::CONFLICT, "INVALID_STATE_TRANSITION")
            }
            BillingError::ValidationFailed { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            BillingError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse::new(error_code, self.0.message());
        (status, Json(body)).into_response()
    }
}

/// API error type that converts webhook errors to HTTP responses.
///
/// The status code drives the gateway's redelivery behavior, so the
/// mapping lives on `WebhookError` itself.
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        let body = ErrorResponse::new("WEBHOOK_ERROR", self.0.to_string());
        (status, Json(body)).into_response()
    }
}
