//! ExpireSubscriptionsHandler - the scheduled subscription expiry sweep.
//!
//! Invoked by an external scheduler through the cron endpoint. Loads every
//! paid plan whose end date has passed, then per plan either sends a grace
//! reminder or downgrades to the free tier. Grace status is recomputed
//! from `subscription_ends_at` on every run; nothing records that a
//! reminder was already sent, so re-running the sweep on the same day
//! re-sends reminders (known gap, inherited behavior).
//!
//! Each plan is read and written in its own statements with no surrounding
//! transaction; a concurrent webhook upgrade interleaves with
//! last-write-wins semantics.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::billing::{ExpiryState, UserPlan};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{EmailMessage, EmailSender, UserPlanRepository};

/// Counts returned to the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Plans considered this run.
    pub scanned: u32,
    /// Grace reminders sent.
    pub reminded: u32,
    /// Plans downgraded to the free tier.
    pub downgraded: u32,
}

/// Handler for the subscription expiry sweep.
pub struct ExpireSubscriptionsHandler {
    plans: Arc<dyn UserPlanRepository>,
    mailer: Arc<dyn EmailSender>,
}

impl ExpireSubscriptionsHandler {
    pub fn new(plans: Arc<dyn UserPlanRepository>, mailer: Arc<dyn EmailSender>) -> Self {
        Self { plans, mailer }
    }

    pub async fn handle(&self) -> Result<SweepSummary, DomainError> {
        let now = Timestamp::now();
        let expired = self.plans.list_expired_paid(now).await?;

        let mut summary = SweepSummary::default();

        for mut plan in expired {
            summary.scanned += 1;

            match plan.expiry_state(now) {
                ExpiryState::InGrace => {
                    if self.send_logged(reminder_email(&plan, now)).await {
                        summary.reminded += 1;
                    }
                }
                ExpiryState::Lapsed => {
                    if let Err(e) = plan.downgrade(now) {
                        // Plan changed under us (e.g. a late webhook already
                        // moved it); skip rather than abort the sweep.
                        tracing::warn!(
                            user_id = %plan.user_id,
                            error = %e,
                            "Skipping downgrade after state change"
                        );
                        continue;
                    }
                    self.plans.update(&plan).await?;
                    summary.downgraded += 1;

                    self.send_logged(downgrade_email(&plan)).await;

                    tracing::info!(
                        user_id = %plan.user_id,
                        "Plan downgraded after grace period"
                    );
                }
                // The repository query already filters to expired paid
                // plans; anything else here means the row moved since.
                ExpiryState::Current | ExpiryState::NotApplicable => {}
            }
        }

        tracing::info!(
            scanned = summary.scanned,
            reminded = summary.reminded,
            downgraded = summary.downgraded,
            "Subscription expiry sweep completed"
        );

        Ok(summary)
    }

    /// Sends a message, logging instead of failing the sweep on error.
    async fn send_logged(&self, message: EmailMessage) -> bool {
        let recipient = message.to.clone();
        match self.mailer.send(message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(recipient = %recipient, error = %e, "Failed to send billing email");
                false
            }
        }
    }
}

fn reminder_email(plan: &UserPlan, now: Timestamp) -> EmailMessage {
    let days_left = plan.grace_days_remaining(now);
    EmailMessage {
        to: plan.email.clone(),
        subject: "Your Pro subscription has expired".to_string(),
        html_body: format!(
            "<p>Your Pro subscription has expired. You have {} day(s) left to renew \
             before your account is moved to the Basic plan.</p>",
            days_left
        ),
    }
}

fn downgrade_email(plan: &UserPlan) -> EmailMessage {
    EmailMessage {
        to: plan.email.clone(),
        subject: "Your account has been moved to the Basic plan".to_string(),
        html_body: "<p>Your Pro subscription was not renewed within the grace period, \
                    so your account is now on the Basic plan. You can upgrade again at \
                    any time from your billing page.</p>"
            .to_string(),
    }
}
