//! GetPlanHandler - Query handler for a user's plan record.

use std::sync::Arc;

use crate::domain::billing::{BillingError, UserPlan};
use crate::domain::foundation::UserId;
use crate::ports::UserPlanRepository;

/// Query for the current user's plan.
#[derive(Debug, Clone)]
pub struct GetPlanQuery {
    pub user_id: UserId,
}

/// Handler returning the plan record, if any.
pub struct GetPlanHandler {
    plans: Arc<dyn UserPlanRepository>,
}

impl GetPlanHandler {
    pub fn new(plans: Arc<dyn UserPlanRepository>) -> Self {
        Self { plans }
    }

    pub async fn handle(&self, query: GetPlanQuery) -> Result<Option<UserPlan>, BillingError> {
        Ok(self.plans.find_by_user_id(&query.user_id).await?)
    }
}
