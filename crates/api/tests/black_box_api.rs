//! End-to-end tests against the real router over HTTP.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use gudang_api::app::services::AppServices;
use gudang_api::sessions::SessionRegistry;
use gudang_auth::User;
use gudang_core::Role;
use gudang_infra::{
    FsAttachmentStore, InMemoryCatalog, InMemoryLedger, InMemoryPending, InMemoryUsers,
    StockService, UserStore,
};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Same router as prod, in-memory tables, ephemeral port.
    async fn spawn() -> Self {
        let users = Arc::new(InMemoryUsers::new());
        users
            .insert(User::new("tiara", "rahasia", Role::Admin))
            .unwrap();
        users.insert(User::new("budi", "kopi", Role::User)).unwrap();

        let upload_dir = std::env::temp_dir().join(format!(
            "gudang-api-test-{}",
            uuid::Uuid::now_v7().simple()
        ));
        let services = Arc::new(AppServices {
            stock: Arc::new(StockService::new(
                Arc::new(InMemoryCatalog::new()),
                Arc::new(InMemoryPending::new()),
                Arc::new(InMemoryLedger::new()),
            )),
            users,
            attachments: Arc::new(FsAttachmentStore::new(upload_dir).unwrap()),
            sessions: Arc::new(SessionRegistry::new()),
        });

        let app = gudang_api::app::build_app_with(services).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let response = reqwest::Client::new()
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/items", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Health stays open.
    let health = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let server = TestServer::spawn().await;
    let response = reqwest::Client::new()
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "username": "tiara", "password": "salah" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn full_out_approval_flow_over_http() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = server.login("tiara", "rahasia").await;
    let user = server.login("budi", "kopi").await;

    // Admin creates the master item.
    let response = client
        .post(format!("{}/items", server.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "code": "ITM-0001",
            "name": "Sirup Original",
            "unit": "box",
            "category": "Minuman",
            "initial_qty": 10,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // A requester may not create items.
    let forbidden = client
        .post(format!("{}/items", server.base_url))
        .bearer_auth(&user)
        .json(&json!({ "code": "ITM-0002", "name": "X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    // Requester submits OUT qty 4 for event "Expo".
    let response = client
        .post(format!("{}/requests/out", server.base_url))
        .bearer_auth(&user)
        .json(&json!({
            "item_code": "ITM-0001",
            "quantity": 4,
            "transaction_type": "Support",
            "event": "Expo",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let request_id = body["id"].as_str().unwrap().to_string();

    // The queue shows it.
    let pending: Value = client
        .get(format!("{}/requests", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pending.as_array().unwrap().len(), 1);

    // A requester may not approve.
    let forbidden = client
        .post(format!("{}/approvals/approve", server.base_url))
        .bearer_auth(&user)
        .json(&json!({ "ids": [request_id] }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    // Admin approves the batch.
    let results: Value = client
        .post(format!("{}/approvals/approve", server.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "ids": [request_id] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results[0]["status"], "approved");
    assert_eq!(results[0]["resulting_balance"], 6);

    // Balance moved, queue drained, ledger has the row.
    let item: Value = client
        .get(format!("{}/items/ITM-0001", server.base_url))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["balance"], 6);

    let pending: Value = client
        .get(format!("{}/requests", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(pending.as_array().unwrap().is_empty());

    let history: Value = client
        .get(format!(
            "{}/history?action=APPROVE_OUT",
            server.base_url
        ))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = history.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["resulting_balance"], 6);

    // Stock card replays cleanly end to end.
    let card: Value = client
        .get(format!(
            "{}/reports/stock-card/Sirup%20Original",
            server.base_url
        ))
        .bearer_auth(&user)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(card["integrity_violations"], 0);
    assert_eq!(card["rows"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn oversized_out_is_auto_rejected_over_http() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = server.login("tiara", "rahasia").await;

    client
        .post(format!("{}/items", server.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "code": "ITM-0001",
            "name": "Teh Botol",
            "unit": "pcs",
            "category": "Minuman",
            "initial_qty": 2,
        }))
        .send()
        .await
        .unwrap();

    let body: Value = client
        .post(format!("{}/requests/out", server.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "item_code": "ITM-0001",
            "quantity": 5,
            "transaction_type": "Sale",
            "event": "Bazar",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let request_id = body["id"].as_str().unwrap().to_string();

    let results: Value = client
        .post(format!("{}/approvals/approve", server.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "ids": [request_id] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results[0]["status"], "rejected_insufficient_stock");
    assert_eq!(results[0]["requested"], 5);
    assert_eq!(results[0]["available"], 2);

    let item: Value = client
        .get(format!("{}/items/ITM-0001", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["balance"], 2);
}

#[tokio::test]
async fn attachment_upload_feeds_an_in_request() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = server.login("tiara", "rahasia").await;

    client
        .post(format!("{}/items", server.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "code": "ITM-0001",
            "name": "Sirup Original",
            "unit": "box",
            "category": "Minuman",
            "initial_qty": 0,
        }))
        .send()
        .await
        .unwrap();

    let uploaded: Value = client
        .post(format!(
            "{}/requests/attachments?filename=do-42.pdf",
            server.base_url
        ))
        .bearer_auth(&admin)
        .body(&b"%PDF-1.4 stub"[..])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let attachment = uploaded["attachment"].as_str().unwrap().to_string();

    // IN without a delivery reference is refused.
    let invalid = client
        .post(format!("{}/requests/in", server.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "item_code": "ITM-0001",
            "quantity": 7,
            "delivery_reference": " ",
            "attachment": attachment,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/requests/in", server.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "item_code": "ITM-0001",
            "quantity": 7,
            "delivery_reference": "DO-2025-0042",
            "attachment": attachment,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let request_id = body["id"].as_str().unwrap().to_string();

    let results: Value = client
        .post(format!("{}/approvals/approve", server.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "ids": [request_id] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results[0]["status"], "approved");
    assert_eq!(results[0]["resulting_balance"], 7);
}

#[tokio::test]
async fn bulk_import_reports_skipped_rows() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = server.login("tiara", "rahasia").await;

    let csv = "Code,Name,Qty,Unit,Category\n\
               ITM-0001,Sirup,10,box,Minuman\n\
               ITM-0001,Sirup Lagi,5,box,Minuman\n\
               ITM-0002,Teh,abc,pcs,Minuman\n";
    let report: Value = client
        .post(format!("{}/items/import", server.base_url))
        .bearer_auth(&admin)
        .body(csv)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(report["added"], 1);
    assert_eq!(report["skipped"].as_array().unwrap().len(), 2);

    // Export includes the one applied row.
    let exported = client
        .get(format!("{}/items/export", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(exported.contains("ITM-0001,Sirup,10,box,Minuman"));
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = server.login("budi", "kopi").await;

    let response = client
        .post(format!("{}/auth/logout", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/whoami", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
