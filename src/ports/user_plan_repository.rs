//! Repository port for the UserPlan aggregate.

use async_trait::async_trait;

use crate::domain::billing::UserPlan;
use crate::domain::foundation::{DomainError, Timestamp, UserId};

/// Persistent storage for per-user plan records.
///
/// `update` is a plain unconditional row update; there is no optimistic
/// concurrency on the plan record, so concurrent writers interleave with
/// last-write-wins semantics.
#[async_trait]
pub trait UserPlanRepository: Send + Sync {
    /// Inserts a new plan record.
    async fn save(&self, plan: &UserPlan) -> Result<(), DomainError>;

    /// Updates an existing plan record.
    async fn update(&self, plan: &UserPlan) -> Result<(), DomainError>;

    /// Finds the plan record for a user.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<UserPlan>, DomainError>;

    /// Lists paid plans whose end date has passed as of `now`.
    ///
    /// Includes plans inside the grace window; the sweep decides per plan
    /// whether to remind or downgrade.
    async fn list_expired_paid(&self, now: Timestamp) -> Result<Vec<UserPlan>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_plan_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn UserPlanRepository) {}
    }
}
