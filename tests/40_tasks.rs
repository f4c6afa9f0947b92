mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn task_is_shared_between_creator_and_assignee_only() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana").await;
    let bo = app.user("Bo").await;
    let cy = app.user("Cy").await;

    let res = app
        .post(
            "/api/tasks",
            &ana,
            json!({ "title": "Pay electricity", "assignedTo": bo.id, "dueDate": "2024-07-01" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["message"], "Task created successfully");
    assert_eq!(res.body["data"]["completed"], false);
    assert_eq!(res.body["data"]["createdBy"]["name"], "Ana");
    assert_eq!(res.body["data"]["assignedTo"]["email"], "bo@example.com");
    let id = res.body["data"]["id"].as_str().unwrap().to_string();

    assert_eq!(app.get("/api/tasks", &ana).await.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(app.get("/api/tasks", &bo).await.body["data"].as_array().unwrap().len(), 1);
    assert!(app.get("/api/tasks", &cy).await.body["data"].as_array().unwrap().is_empty());

    // Outsider gets the same 404 as for a missing task
    let res = app.put(&format!("/api/tasks/{}", id), &cy, json!({ "completed": true })).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "Task not found or access denied");

    // Assignee may complete it
    let res = app.put(&format!("/api/tasks/{}", id), &bo, json!({ "completed": true })).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["completed"], true);
    assert_eq!(res.body["data"]["title"], "Pay electricity");

    assert_eq!(app.delete(&format!("/api/tasks/{}", id), &cy).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&format!("/api/tasks/{}", id), &bo).await.status, StatusCode::OK);
    assert!(app.get("/api/tasks", &ana).await.body["data"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn explicit_null_clears_optional_fields() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana").await;

    let res = app
        .post(
            "/api/tasks",
            &ana,
            json!({ "title": "Book dentist", "description": "Before June", "assignedTo": ana.id, "dueDate": "2024-05-30" }),
        )
        .await;
    let id = res.body["data"]["id"].as_str().unwrap().to_string();

    let res = app
        .put(&format!("/api/tasks/{}", id), &ana, json!({ "description": null, "dueDate": null }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["data"]["description"].is_null());
    assert!(res.body["data"]["dueDate"].is_null());
    assert_eq!(res.body["data"]["title"], "Book dentist");
    Ok(())
}

#[tokio::test]
async fn task_validation_and_orphaned_references() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana").await;

    let res = app.post("/api/tasks", &ana, json!({ "description": "No title" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field_errors"]["title"], "Title is required");
    assert_eq!(res.body["field_errors"]["assignedTo"], "Assigned user is required");

    let res = app
        .post("/api/tasks", &ana, json!({ "title": "t".repeat(101), "assignedTo": ana.id }))
        .await;
    assert_eq!(res.body["field_errors"]["title"], "Title cannot exceed 100 characters");

    // Assignee that does not exist renders as null
    let ghost = uuid::Uuid::new_v4();
    let res = app.post("/api/tasks", &ana, json!({ "title": "Ghost chore", "assignedTo": ghost })).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert!(res.body["data"]["assignedTo"].is_null());
    assert_eq!(res.body["data"]["createdBy"]["id"], ana.id.to_string());
    Ok(())
}
