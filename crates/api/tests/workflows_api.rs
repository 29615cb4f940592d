//! HTTP-level integration tests for the `/workflows` resource.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

const WORKFLOWS: &str = "/api/v1/workflows";

fn sample_graph() -> serde_json::Value {
    json!({
        "name": "Tyre recovery",
        "status": "researching",
        "nodes": ["collect", "shred", "pyrolysis"],
        "connections": [
            { "from": "collect", "to": "shred" },
            { "from": "shred", "to": "pyrolysis", "edgeStyle": "redDashed" },
        ],
        "nodePositions": {
            "collect": { "x": 0, "y": 0 },
            "shred": { "x": 200, "y": 40.5 },
        },
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_get_update_delete(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(app.clone(), WORKFLOWS, sample_graph(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(created["connections"][1]["edgeStyle"], "redDashed");
    let uri = format!("{WORKFLOWS}/{}", created["id"]);

    let fetched = body_json(get(app.clone(), &uri).await).await;
    assert_eq!(fetched["name"], "Tyre recovery");

    // Partial update: only the name changes.
    let response = put_json_auth(app.clone(), &uri, json!({ "name": "Renamed" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["status"], "researching");
    assert_eq!(updated["connections"], created["connections"]);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Workflow deleted successfully"
    );

    let response = get(app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_graph_is_itemized(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({
        "name": "",
        "nodes": ["a", "a"],
        "connections": [{ "from": "a" }],
    });
    let response = post_json_auth(app, WORKFLOWS, body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let details = body_json(response).await["details"].clone();
    assert!(details.as_array().unwrap().len() >= 3, "{details}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_removing_a_node_orphans_its_connections(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let created = body_json(post_json_auth(app.clone(), WORKFLOWS, sample_graph(), &token).await).await;
    let uri = format!("{WORKFLOWS}/{}", created["id"]);

    // Connections are re-checked against the new node list.
    let response = put_json_auth(
        app,
        &uri,
        json!({ "nodes": ["collect", "shred"] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_positions_are_stored_as_absent(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let mut body = sample_graph();
    body["nodePositions"] = json!({});
    let response = post_json_auth(app, WORKFLOWS, body, &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_json(response).await.get("nodePositions").is_none());
}
