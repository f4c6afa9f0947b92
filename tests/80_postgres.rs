mod common;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use common::{pg_store, unique_email};
use family_finance_api::database::{
    DatabaseError, ExpenseRepository, GoalRepository, PgStore, SavingsRepository, Store, TaskRepository,
    UserRepository,
};
use family_finance_api::models::{
    ExpenseCategory, ExpenseChanges, GoalChanges, NewExpense, NewGoal, NewSavings, NewTask, NewUser, ProfileChanges,
    SavingsChanges, TaskChanges, Theme, User,
};

async fn user(store: &PgStore, name: &str) -> Result<User> {
    Ok(store
        .insert_user(NewUser::new(name, unique_email(name), "not-a-real-hash"))
        .await?)
}

fn expense(owner: Uuid, cents: i64, category: ExpenseCategory, description: &str, day: u32) -> NewExpense {
    NewExpense {
        user_id: owner,
        amount: Decimal::new(cents, 2),
        category,
        description: description.to_string(),
        date: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn expenses_are_owner_scoped_and_ordered() -> Result<()> {
    let Some(store) = pg_store().await? else {
        return Ok(());
    };
    assert_eq!(store.backend(), "postgres");
    store.ping().await?;

    let ana = user(&store, "Ana").await?;
    let ben = user(&store, "Ben").await?;

    let older = store
        .insert_expense(expense(ana.id, 1234, ExpenseCategory::Bills, "Phone", 1))
        .await?;
    let first_same_day = store
        .insert_expense(expense(ana.id, 500, ExpenseCategory::Groceries, "Bread", 3))
        .await?;
    let second_same_day = store
        .insert_expense(expense(ana.id, 750, ExpenseCategory::Transport, "Bus", 3))
        .await?;
    store
        .insert_expense(expense(ben.id, 9900, ExpenseCategory::Other, "Ben's", 4))
        .await?;

    assert_eq!(older.amount, Decimal::new(1234, 2));
    assert_eq!(older.category, ExpenseCategory::Bills);

    let listed: Vec<Uuid> = store.list_expenses(ana.id).await?.into_iter().map(|e| e.id).collect();
    assert_eq!(listed, vec![second_same_day.id, first_same_day.id, older.id]);

    let changes = ExpenseChanges {
        description: Some("Stolen".to_string()),
        ..Default::default()
    };
    assert!(store.update_expense(older.id, ben.id, changes).await?.is_none());
    assert!(!store.delete_expense(older.id, ben.id).await?);

    let changes = ExpenseChanges {
        amount: Some(Decimal::new(1999, 2)),
        category: Some(ExpenseCategory::Health),
        ..Default::default()
    };
    let updated = store
        .update_expense(older.id, ana.id, changes)
        .await?
        .expect("owner can update");
    assert_eq!(updated.amount, Decimal::new(1999, 2));
    assert_eq!(updated.category, ExpenseCategory::Health);
    assert_eq!(updated.description, "Phone");

    assert!(store.delete_expense(older.id, ana.id).await?);
    assert_eq!(store.list_expenses(ana.id).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn savings_are_owner_scoped() -> Result<()> {
    let Some(store) = pg_store().await? else {
        return Ok(());
    };
    let ana = user(&store, "Ana").await?;
    let ben = user(&store, "Ben").await?;

    let saved = store
        .insert_savings(NewSavings {
            user_id: ana.id,
            amount: Decimal::new(25000, 2),
            description: "Bonus".to_string(),
            date: Utc::now(),
        })
        .await?;

    assert!(store.list_savings(ben.id).await?.is_empty());
    let changes = SavingsChanges {
        amount: Some(Decimal::new(1, 2)),
        ..Default::default()
    };
    assert!(store.update_savings(saved.id, ben.id, changes.clone()).await?.is_none());

    let updated = store
        .update_savings(saved.id, ana.id, changes)
        .await?
        .expect("owner can update");
    assert_eq!(updated.amount, Decimal::new(1, 2));
    assert_eq!(updated.description, "Bonus");
    Ok(())
}

#[tokio::test]
async fn explicit_null_clears_task_fields() -> Result<()> {
    let Some(store) = pg_store().await? else {
        return Ok(());
    };
    let ana = user(&store, "Ana").await?;
    let ben = user(&store, "Ben").await?;
    let carl = user(&store, "Carl").await?;

    let due = Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap();
    let task = store
        .insert_task(NewTask {
            title: "Dishes".to_string(),
            description: Some("After dinner".to_string()),
            assigned_to: ben.id,
            created_by: ana.id,
            due_date: Some(due),
        })
        .await?;

    let cleared = store
        .update_task(
            task.id,
            TaskChanges {
                description: Some(None),
                completed: Some(true),
                ..Default::default()
            },
        )
        .await?
        .expect("task exists");
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.due_date, Some(due));
    assert!(cleared.completed);
    assert_eq!(cleared.title, "Dishes");

    let cleared = store
        .update_task(
            task.id,
            TaskChanges {
                due_date: Some(None),
                ..Default::default()
            },
        )
        .await?
        .expect("task exists");
    assert_eq!(cleared.due_date, None);

    assert_eq!(store.list_tasks(ben.id).await?.len(), 1);
    assert_eq!(store.list_tasks(ana.id).await?.len(), 1);
    assert!(store.list_tasks(carl.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn goal_visibility_follows_assignees() -> Result<()> {
    let Some(store) = pg_store().await? else {
        return Ok(());
    };
    let ana = user(&store, "Ana").await?;
    let ben = user(&store, "Ben").await?;
    let carl = user(&store, "Carl").await?;

    let goal = store
        .insert_goal(NewGoal {
            title: "Vacation".to_string(),
            description: Some("Lisbon".to_string()),
            target_amount: Decimal::new(200000, 2),
            current_amount: Decimal::ZERO,
            due_date: None,
            created_by: ana.id,
            assigned_to: vec![ben.id],
        })
        .await?;

    assert_eq!(store.list_goals(ben.id).await?.len(), 1);
    assert!(store.list_goals(carl.id).await?.is_empty());

    let updated = store
        .update_goal(
            goal.id,
            GoalChanges {
                assigned_to: Some(vec![carl.id]),
                description: Some(None),
                current_amount: Some(Decimal::new(250000, 2)),
                ..Default::default()
            },
        )
        .await?
        .expect("goal exists");
    assert_eq!(updated.assigned_to, vec![carl.id]);
    assert_eq!(updated.description, None);
    assert_eq!(updated.current_amount, Decimal::new(250000, 2));

    assert!(store.list_goals(ben.id).await?.is_empty());
    assert_eq!(store.list_goals(carl.id).await?.len(), 1);
    assert_eq!(store.list_goals(ana.id).await?.len(), 1);

    let summaries = store.user_summaries(&[ana.id, carl.id, Uuid::new_v4()]).await?;
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[&carl.id].name, "Carl");

    assert!(store.delete_goal(goal.id).await?);
    assert!(store.find_goal(goal.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() -> Result<()> {
    let Some(store) = pg_store().await? else {
        return Ok(());
    };
    let ana = user(&store, "Ana").await?;
    let ben = user(&store, "Ben").await?;

    let duplicate = store
        .insert_user(NewUser::new("Other Ana", ana.email.clone(), "not-a-real-hash"))
        .await;
    assert!(matches!(duplicate, Err(DatabaseError::Conflict(ref msg)) if msg == "Email is already registered"));

    let taken = store
        .update_user(
            ben.id,
            ProfileChanges {
                email: Some(ana.email.clone()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(taken, Err(DatabaseError::Conflict(_))));

    let updated = store
        .update_user(
            ben.id,
            ProfileChanges {
                theme: Some(Theme::Dark),
                currency: Some("EUR".to_string()),
                ..Default::default()
            },
        )
        .await?
        .expect("user exists");
    assert_eq!(updated.theme, Theme::Dark);
    assert_eq!(updated.currency, "EUR");
    assert_eq!(updated.email, ben.email);
    Ok(())
}
