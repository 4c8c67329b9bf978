//! PostgreSQL implementation of UserPlanRepository.
//!
//! Provides persistent storage for UserPlan records using PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{BillingCycle, PlanType, UserPlan};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::UserPlanRepository;

/// PostgreSQL implementation of the UserPlanRepository port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
/// Updates are plain row updates keyed by user id; there is no version
/// column or optimistic concurrency on this table.
pub struct PostgresUserPlanRepository {
    pool: PgPool,
}

impl PostgresUserPlanRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user plan.
#[derive(Debug, sqlx::FromRow)]
struct UserPlanRow {
    user_id: Uuid,
    email: String,
    plan_type: String,
    billing_cycle: Option<String>,
    subscription_ends_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserPlanRow> for UserPlan {
    type Error = DomainError;

    fn try_from(row: UserPlanRow) -> Result<Self, Self::Error> {
        let plan_type = parse_plan_type(&row.plan_type)?;
        let billing_cycle = row
            .billing_cycle
            .as_deref()
            .map(parse_billing_cycle)
            .transpose()?;

        Ok(UserPlan {
            user_id: UserId::from_uuid(row.user_id),
            email: row.email,
            plan_type,
            billing_cycle,
            subscription_ends_at: row.subscription_ends_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_plan_type(s: &str) -> Result<PlanType, DomainError> {
    match s.to_lowercase().as_str() {
        "basic" => Ok(PlanType::Basic),
        "pro" => Ok(PlanType::Pro),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid plan_type value: {}", s),
        )),
    }
}

fn parse_billing_cycle(s: &str) -> Result<BillingCycle, DomainError> {
    match s.to_lowercase().as_str() {
        "monthly" => Ok(BillingCycle::Monthly),
        "yearly" => Ok(BillingCycle::Yearly),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid billing_cycle value: {}", s),
        )),
    }
}

#[async_trait]
impl UserPlanRepository for PostgresUserPlanRepository {
    async fn save(&self, plan: &UserPlan) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_plans (
                user_id, email, plan_type, billing_cycle, subscription_ends_at,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(plan.user_id.as_uuid())
        .bind(&plan.email)
        .bind(plan.plan_type.as_str())
        .bind(plan.billing_cycle.map(|c| c.as_str()))
        .bind(plan.subscription_ends_at.map(|t| *t.as_datetime()))
        .bind(plan.created_at.as_datetime())
        .bind(plan.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save user plan: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update(&self, plan: &UserPlan) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE user_plans SET
                email = $2,
                plan_type = $3,
                billing_cycle = $4,
                subscription_ends_at = $5,
                updated_at = $6
            WHERE user_id = $1
            "#,
        )
        .bind(plan.user_id.as_uuid())
        .bind(&plan.email)
        .bind(plan.plan_type.as_str())
        .bind(plan.billing_cycle.map(|c| c.as_str()))
        .bind(plan.subscription_ends_at.map(|t| *t.as_datetime()))
        .bind(plan.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update user plan: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PlanNotFound,
                "User plan not found",
            ));
        }

        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<UserPlan>, DomainError> {
        let row: Option<UserPlanRow> = sqlx::query_as(
            r#"
            SELECT user_id, email, plan_type, billing_cycle, subscription_ends_at,
                   created_at, updated_at
            FROM user_plans
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find user plan: {}", e),
            )
        })?;

        row.map(UserPlan::try_from).transpose()
    }

    async fn list_expired_paid(&self, now: Timestamp) -> Result<Vec<UserPlan>, DomainError> {
        let rows: Vec<UserPlanRow> = sqlx::query_as(
            r#"
            SELECT user_id, email, plan_type, billing_cycle, subscription_ends_at,
                   created_at, updated_at
            FROM user_plans
            WHERE plan_type = 'pro'
              AND subscription_ends_at IS NOT NULL
              AND subscription_ends_at < $1
            ORDER BY subscription_ends_at
            "#,
        )
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list expired plans: {}", e),
            )
        })?;

        rows.into_iter().map(UserPlan::try_from).collect()
    }
}
