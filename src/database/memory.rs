use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::access::{goal_access, owner_access, task_access};
use crate::database::manager::DatabaseError;
use crate::database::repository::{
    ExpenseRepository, GoalRepository, SavingsRepository, Store, TaskRepository, UserRepository,
};
use crate::models::{
    Expense, ExpenseChanges, Goal, GoalChanges, NewExpense, NewGoal, NewSavings, NewTask, NewUser, ProfileChanges,
    Savings, SavingsChanges, Task, TaskChanges, Theme, User, UserSummary,
};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    passwords: HashMap<Uuid, String>,
    expenses: HashMap<Uuid, Expense>,
    savings: HashMap<Uuid, Savings>,
    goals: HashMap<Uuid, Goal>,
    tasks: HashMap<Uuid, Task>,
}

impl Collections {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }
}

/// Process-local document store for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored password hashes; only tests look at this.
    pub async fn credential_count(&self) -> usize {
        self.data.read().await.passwords.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let data = self.data.read().await;
        let mut users: Vec<User> = data.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.data.read().await.users.get(&id).cloned())
    }

    async fn user_summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, DatabaseError> {
        let data = self.data.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| data.users.get(id))
            .map(|user| (user.id, UserSummary::from(user)))
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut data = self.data.write().await;
        if data.email_taken(&user.email, None) {
            return Err(DatabaseError::Conflict("Email is already registered".to_string()));
        }

        let now = Utc::now();
        let stored = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            theme: Theme::default(),
            language: "en".to_string(),
            currency: "USD".to_string(),
            profile_picture: String::new(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        };
        data.passwords.insert(stored.id, user.password_hash);
        data.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_user(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<User>, DatabaseError> {
        let mut data = self.data.write().await;
        if let Some(email) = &changes.email {
            if data.email_taken(email, Some(id)) {
                return Err(DatabaseError::Conflict("Email is already registered".to_string()));
            }
        }

        let Some(user) = data.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(theme) = changes.theme {
            user.theme = theme;
        }
        if let Some(language) = changes.language {
            user.language = language;
        }
        if let Some(currency) = changes.currency {
            user.currency = currency;
        }
        if let Some(profile_picture) = changes.profile_picture {
            user.profile_picture = profile_picture;
        }
        if let Some(description) = changes.description {
            user.description = description;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl ExpenseRepository for MemoryStore {
    async fn list_expenses(&self, owner: Uuid) -> Result<Vec<Expense>, DatabaseError> {
        let data = self.data.read().await;
        let mut expenses: Vec<Expense> = data
            .expenses
            .values()
            .filter(|e| owner_access(owner, e.user_id).can_read())
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(expenses)
    }

    async fn insert_expense(&self, expense: NewExpense) -> Result<Expense, DatabaseError> {
        let now = Utc::now();
        let stored = Expense {
            id: Uuid::new_v4(),
            user_id: expense.user_id,
            amount: expense.amount,
            category: expense.category,
            description: expense.description,
            date: expense.date,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.expenses.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_expense(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Option<Expense>, DatabaseError> {
        let mut data = self.data.write().await;
        let Some(expense) = data
            .expenses
            .get_mut(&id)
            .filter(|e| owner_access(owner, e.user_id).can_write())
        else {
            return Ok(None);
        };

        if let Some(amount) = changes.amount {
            expense.amount = amount;
        }
        if let Some(category) = changes.category {
            expense.category = category;
        }
        if let Some(description) = changes.description {
            expense.description = description;
        }
        if let Some(date) = changes.date {
            expense.date = date;
        }
        expense.updated_at = Utc::now();
        Ok(Some(expense.clone()))
    }

    async fn delete_expense(&self, id: Uuid, owner: Uuid) -> Result<bool, DatabaseError> {
        let mut data = self.data.write().await;
        let owned = data
            .expenses
            .get(&id)
            .map(|e| owner_access(owner, e.user_id).can_write())
            .unwrap_or(false);
        if owned {
            data.expenses.remove(&id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl SavingsRepository for MemoryStore {
    async fn list_savings(&self, owner: Uuid) -> Result<Vec<Savings>, DatabaseError> {
        let data = self.data.read().await;
        let mut savings: Vec<Savings> = data
            .savings
            .values()
            .filter(|s| owner_access(owner, s.user_id).can_read())
            .cloned()
            .collect();
        savings.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(savings)
    }

    async fn insert_savings(&self, savings: NewSavings) -> Result<Savings, DatabaseError> {
        let now = Utc::now();
        let stored = Savings {
            id: Uuid::new_v4(),
            user_id: savings.user_id,
            amount: savings.amount,
            description: savings.description,
            date: savings.date,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.savings.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_savings(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: SavingsChanges,
    ) -> Result<Option<Savings>, DatabaseError> {
        let mut data = self.data.write().await;
        let Some(savings) = data
            .savings
            .get_mut(&id)
            .filter(|s| owner_access(owner, s.user_id).can_write())
        else {
            return Ok(None);
        };

        if let Some(amount) = changes.amount {
            savings.amount = amount;
        }
        if let Some(description) = changes.description {
            savings.description = description;
        }
        if let Some(date) = changes.date {
            savings.date = date;
        }
        savings.updated_at = Utc::now();
        Ok(Some(savings.clone()))
    }

    async fn delete_savings(&self, id: Uuid, owner: Uuid) -> Result<bool, DatabaseError> {
        let mut data = self.data.write().await;
        let owned = data
            .savings
            .get(&id)
            .map(|s| owner_access(owner, s.user_id).can_write())
            .unwrap_or(false);
        if owned {
            data.savings.remove(&id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl GoalRepository for MemoryStore {
    async fn list_goals(&self, caller: Uuid) -> Result<Vec<Goal>, DatabaseError> {
        let data = self.data.read().await;
        let mut goals: Vec<Goal> = data
            .goals
            .values()
            .filter(|g| goal_access(caller, g).can_read())
            .cloned()
            .collect();
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    async fn find_goal(&self, id: Uuid) -> Result<Option<Goal>, DatabaseError> {
        Ok(self.data.read().await.goals.get(&id).cloned())
    }

    async fn insert_goal(&self, goal: NewGoal) -> Result<Goal, DatabaseError> {
        let now = Utc::now();
        let stored = Goal {
            id: Uuid::new_v4(),
            title: goal.title,
            description: goal.description,
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            due_date: goal.due_date,
            created_by: goal.created_by,
            assigned_to: goal.assigned_to,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.goals.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_goal(&self, id: Uuid, changes: GoalChanges) -> Result<Option<Goal>, DatabaseError> {
        let mut data = self.data.write().await;
        let Some(goal) = data.goals.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            goal.title = title;
        }
        if let Some(description) = changes.description {
            goal.description = description;
        }
        if let Some(target_amount) = changes.target_amount {
            goal.target_amount = target_amount;
        }
        if let Some(current_amount) = changes.current_amount {
            goal.current_amount = current_amount;
        }
        if let Some(due_date) = changes.due_date {
            goal.due_date = due_date;
        }
        if let Some(assigned_to) = changes.assigned_to {
            goal.assigned_to = assigned_to;
        }
        goal.updated_at = Utc::now();
        Ok(Some(goal.clone()))
    }

    async fn delete_goal(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.data.write().await.goals.remove(&id).is_some())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn list_tasks(&self, caller: Uuid) -> Result<Vec<Task>, DatabaseError> {
        let data = self.data.read().await;
        let mut tasks: Vec<Task> = data
            .tasks
            .values()
            .filter(|t| task_access(caller, t).can_read())
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, DatabaseError> {
        Ok(self.data.read().await.tasks.get(&id).cloned())
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task, DatabaseError> {
        let now = Utc::now();
        let stored = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            completed: false,
            assigned_to: task.assigned_to,
            created_by: task.created_by,
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.tasks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, DatabaseError> {
        let mut data = self.data.write().await;
        let Some(task) = data.tasks.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(completed) = changes.completed {
            task.completed = completed;
        }
        if let Some(assigned_to) = changes.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(due_date) = changes.due_date {
            task.due_date = due_date;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.data.write().await.tasks.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
