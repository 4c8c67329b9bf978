//! PostgreSQL adapters.

mod user_plan_repository;

pub use user_plan_repository::PostgresUserPlanRepository;
