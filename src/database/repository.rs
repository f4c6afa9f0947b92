use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::models::{
    Expense, ExpenseChanges, Goal, GoalChanges, NewExpense, NewGoal, NewSavings, NewTask, NewUser, ProfileChanges,
    Savings, SavingsChanges, Task, TaskChanges, User, UserSummary,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, newest first.
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    /// Name/email summaries for the given ids; unknown ids are absent from the map.
    async fn user_summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, DatabaseError>;

    /// Registration entry point for the external auth service.
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn update_user(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<User>, DatabaseError>;
}

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// The owner's expenses by date, then creation time, both descending.
    async fn list_expenses(&self, owner: Uuid) -> Result<Vec<Expense>, DatabaseError>;

    async fn insert_expense(&self, expense: NewExpense) -> Result<Expense, DatabaseError>;

    /// `None` when no expense with this id belongs to `owner`.
    async fn update_expense(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Option<Expense>, DatabaseError>;

    /// `false` when no expense with this id belongs to `owner`.
    async fn delete_expense(&self, id: Uuid, owner: Uuid) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait SavingsRepository: Send + Sync {
    async fn list_savings(&self, owner: Uuid) -> Result<Vec<Savings>, DatabaseError>;

    async fn insert_savings(&self, savings: NewSavings) -> Result<Savings, DatabaseError>;

    async fn update_savings(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: SavingsChanges,
    ) -> Result<Option<Savings>, DatabaseError>;

    async fn delete_savings(&self, id: Uuid, owner: Uuid) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Goals the caller created or is assigned to, newest first.
    async fn list_goals(&self, caller: Uuid) -> Result<Vec<Goal>, DatabaseError>;

    async fn find_goal(&self, id: Uuid) -> Result<Option<Goal>, DatabaseError>;

    async fn insert_goal(&self, goal: NewGoal) -> Result<Goal, DatabaseError>;

    async fn update_goal(&self, id: Uuid, changes: GoalChanges) -> Result<Option<Goal>, DatabaseError>;

    async fn delete_goal(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Tasks the caller created or is assigned to, newest first.
    async fn list_tasks(&self, caller: Uuid) -> Result<Vec<Task>, DatabaseError>;

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, DatabaseError>;

    async fn insert_task(&self, task: NewTask) -> Result<Task, DatabaseError>;

    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, DatabaseError>;

    async fn delete_task(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

/// The document store: every collection plus a liveness probe.
#[async_trait]
pub trait Store:
    UserRepository + ExpenseRepository + SavingsRepository + GoalRepository + TaskRepository
{
    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
