use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::repository::{
    ExpenseRepository, GoalRepository, SavingsRepository, Store, TaskRepository, UserRepository,
};
use crate::models::{
    Expense, ExpenseChanges, Goal, GoalChanges, NewExpense, NewGoal, NewSavings, NewTask, NewUser, ProfileChanges,
    Savings, SavingsChanges, Task, TaskChanges, User, UserSummary,
};

const USER_COLUMNS: &str =
    "id, name, email, theme, language, currency, profile_picture, description, created_at, updated_at";
const EXPENSE_COLUMNS: &str = "id, user_id, amount, category, description, date, created_at, updated_at";
const SAVINGS_COLUMNS: &str = "id, user_id, amount, description, date, created_at, updated_at";
const GOAL_COLUMNS: &str = "id, title, description, target_amount, current_amount, due_date, created_by, \
                            assigned_to, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, completed, assigned_to, created_by, due_date, created_at, updated_at";

const EMAIL_TAKEN: &str = "Email is already registered";

/// Postgres-backed document store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn classify(err: sqlx::Error) -> DatabaseError {
    DatabaseError::classify(err, "Conflicting record")
}

#[async_trait]
impl UserRepository for PgStore {
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn user_summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, DatabaseError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, UserSummary>("SELECT id, name, email FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        Ok(rows.into_iter().map(|summary| (summary.id, summary)).collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::classify(e, EMAIL_TAKEN))
    }

    async fn update_user(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                theme = COALESCE($4, theme),
                language = COALESCE($5, language),
                currency = COALESCE($6, currency),
                profile_picture = COALESCE($7, profile_picture),
                description = COALESCE($8, description),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.email)
            .bind(changes.theme)
            .bind(changes.language)
            .bind(changes.currency)
            .bind(changes.profile_picture)
            .bind(changes.description)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::classify(e, EMAIL_TAKEN))
    }
}

#[async_trait]
impl ExpenseRepository for PgStore {
    async fn list_expenses(&self, owner: Uuid) -> Result<Vec<Expense>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM expenses WHERE user_id = $1 ORDER BY date DESC, created_at DESC",
            EXPENSE_COLUMNS
        );
        sqlx::query_as::<_, Expense>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn insert_expense(&self, expense: NewExpense) -> Result<Expense, DatabaseError> {
        let sql = format!(
            "INSERT INTO expenses (id, user_id, amount, category, description, date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            EXPENSE_COLUMNS
        );
        sqlx::query_as::<_, Expense>(&sql)
            .bind(Uuid::new_v4())
            .bind(expense.user_id)
            .bind(expense.amount)
            .bind(expense.category)
            .bind(&expense.description)
            .bind(expense.date)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_expense(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Option<Expense>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE expenses SET
                amount = COALESCE($3, amount),
                category = COALESCE($4, category),
                description = COALESCE($5, description),
                date = COALESCE($6, date),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        );
        sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.amount)
            .bind(changes.category)
            .bind(changes.description)
            .bind(changes.date)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn delete_expense(&self, id: Uuid, owner: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SavingsRepository for PgStore {
    async fn list_savings(&self, owner: Uuid) -> Result<Vec<Savings>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM savings WHERE user_id = $1 ORDER BY date DESC, created_at DESC",
            SAVINGS_COLUMNS
        );
        sqlx::query_as::<_, Savings>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn insert_savings(&self, savings: NewSavings) -> Result<Savings, DatabaseError> {
        let sql = format!(
            "INSERT INTO savings (id, user_id, amount, description, date) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            SAVINGS_COLUMNS
        );
        sqlx::query_as::<_, Savings>(&sql)
            .bind(Uuid::new_v4())
            .bind(savings.user_id)
            .bind(savings.amount)
            .bind(&savings.description)
            .bind(savings.date)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_savings(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: SavingsChanges,
    ) -> Result<Option<Savings>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE savings SET
                amount = COALESCE($3, amount),
                description = COALESCE($4, description),
                date = COALESCE($5, date),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            SAVINGS_COLUMNS
        );
        sqlx::query_as::<_, Savings>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.amount)
            .bind(changes.description)
            .bind(changes.date)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn delete_savings(&self, id: Uuid, owner: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM savings WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl GoalRepository for PgStore {
    async fn list_goals(&self, caller: Uuid) -> Result<Vec<Goal>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM goals WHERE created_by = $1 OR $1 = ANY(assigned_to) ORDER BY created_at DESC",
            GOAL_COLUMNS
        );
        sqlx::query_as::<_, Goal>(&sql)
            .bind(caller)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_goal(&self, id: Uuid) -> Result<Option<Goal>, DatabaseError> {
        let sql = format!("SELECT {} FROM goals WHERE id = $1", GOAL_COLUMNS);
        sqlx::query_as::<_, Goal>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn insert_goal(&self, goal: NewGoal) -> Result<Goal, DatabaseError> {
        let sql = format!(
            "INSERT INTO goals (id, title, description, target_amount, current_amount, due_date, created_by, assigned_to) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            GOAL_COLUMNS
        );
        sqlx::query_as::<_, Goal>(&sql)
            .bind(Uuid::new_v4())
            .bind(&goal.title)
            .bind(&goal.description)
            .bind(goal.target_amount)
            .bind(goal.current_amount)
            .bind(goal.due_date)
            .bind(goal.created_by)
            .bind(&goal.assigned_to)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_goal(&self, id: Uuid, changes: GoalChanges) -> Result<Option<Goal>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE goals SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                target_amount = COALESCE($5, target_amount),
                current_amount = COALESCE($6, current_amount),
                due_date = CASE WHEN $7 THEN $8 ELSE due_date END,
                assigned_to = COALESCE($9, assigned_to),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            GOAL_COLUMNS
        );
        sqlx::query_as::<_, Goal>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description.is_some())
            .bind(changes.description.flatten())
            .bind(changes.target_amount)
            .bind(changes.current_amount)
            .bind(changes.due_date.is_some())
            .bind(changes.due_date.flatten())
            .bind(changes.assigned_to)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn delete_goal(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn list_tasks(&self, caller: Uuid) -> Result<Vec<Task>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE created_by = $1 OR assigned_to = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(caller)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, DatabaseError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task, DatabaseError> {
        let sql = format!(
            "INSERT INTO tasks (id, title, description, assigned_to, created_by, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(Uuid::new_v4())
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.assigned_to)
            .bind(task.created_by)
            .bind(task.due_date)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                completed = COALESCE($5, completed),
                assigned_to = COALESCE($6, assigned_to),
                due_date = CASE WHEN $7 THEN $8 ELSE due_date END,
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description.is_some())
            .bind(changes.description.flatten())
            .bind(changes.completed)
            .bind(changes.assigned_to)
            .bind(changes.due_date.is_some())
            .bind(changes.due_date.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
        Ok(())
    }
}
