use std::sync::Arc;

use catalog_api::app::{build_app, AppServices};
use catalog_infra::AppConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

const ADMIN_TOKEN: &str = "test-admin-token";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory backends, ephemeral port.
        let config = AppConfig {
            admin_token: Some(ADMIN_TOKEN.to_string()),
            max_upload_mb: 1,
            ..Default::default()
        };
        let app = build_app(Arc::new(AppServices::in_memory(&config)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).bearer_auth(ADMIN_TOKEN).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(ADMIN_TOKEN)
            .json(&body)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .patch(self.url(path))
            .bearer_auth(ADMIN_TOKEN)
            .json(&body)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.delete(self.url(path)).bearer_auth(ADMIN_TOKEN).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn publishable_pump(category: &str) -> Value {
    json!({
        "name": "VS Pump",
        "description": "Variable speed pool pump",
        "category": category,
        "status": "Active",
        "data": {
            "features": ["Quiet", "Efficient"],
            "images": ["https://cdn.example.com/pump.png"]
        }
    })
}

#[tokio::test]
async fn health_is_public_and_admin_routes_need_the_token() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/categories")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unauthorized");

    let res = srv
        .client
        .get(srv.url("/categories"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn category_lifecycle_with_dependent_products() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv
        .post("/categories", json!({ "name": "Spa & Pool Equipment!!", "description": "Everything wet" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["slug"], "spa-pool-equipment");
    assert_eq!(body["data"]["status"], "Active");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = srv.post("/categories", json!({ "name": "Spa Pool Equipment" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_slug");

    let (status, body) = srv.get("/categories/by-slug/spa-pool-equipment").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);

    let (status, body) = srv.get("/categories?q=WET").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, product) = srv.post("/products", publishable_pump("spa-pool-equipment")).await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["data"]["id"].as_i64().unwrap();

    let (status, body) = srv.get(&format!("/categories/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product_count"], 1);

    let (status, body) = srv.delete(&format!("/categories/{id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "has_dependents");

    let (status, _) = srv.delete(&format!("/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = srv.delete(&format!("/categories/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = srv.get(&format!("/categories/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn category_rename_and_status_filter() {
    let srv = TestServer::spawn().await;
    let (_, pumps) = srv.post("/categories", json!({ "name": "Pumps" })).await;
    srv.post("/categories", json!({ "name": "Heaters", "status": "Inactive" })).await;
    let id = pumps["data"]["id"].as_i64().unwrap();

    let (status, body) = srv.patch(&format!("/categories/{id}"), json!({ "name": "Pool Pumps" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "pool-pumps");

    let (_, active) = srv.get("/categories?status=active").await;
    let names: Vec<_> = active["data"].as_array().unwrap().iter().map(|c| c["name"].clone()).collect();
    assert_eq!(names, vec![json!("Pool Pumps")]);

    let (_, inactive) = srv.get("/categories?status=inactive").await;
    assert_eq!(inactive["data"][0]["name"], "Heaters");

    let (status, body) = srv.get("/categories?status=archived").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn subcategory_hierarchy_rules() {
    let srv = TestServer::spawn().await;
    let (_, a) = srv.post("/categories", json!({ "name": "Pumps" })).await;
    let (_, b) = srv.post("/categories", json!({ "name": "Filters" })).await;
    let a = a["data"]["id"].as_i64().unwrap();
    let b = b["data"]["id"].as_i64().unwrap();

    let (status, top) = srv
        .post(&format!("/categories/{a}/subcategories"), json!({ "name": "Accessories" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let top_id = top["data"]["id"].as_i64().unwrap();

    // Same slug in another category is fine; twice in the same one is not.
    let (status, _) = srv
        .post(&format!("/categories/{b}/subcategories"), json!({ "name": "Accessories" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = srv
        .post(&format!("/categories/{a}/subcategories"), json!({ "name": "accessories" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_slug");

    let (status, child) = srv
        .post(
            &format!("/categories/{a}/subcategories"),
            json!({ "name": "Lids", "parent_subcategory_id": top_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let child_id = child["data"]["id"].as_i64().unwrap();

    let (status, body) = srv
        .post(
            &format!("/categories/{a}/subcategories"),
            json!({ "name": "Too Deep", "parent_subcategory_id": child_id }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invariant_violation");

    let (_, children) = srv.get(&format!("/subcategories/{top_id}/children")).await;
    assert_eq!(children["data"][0]["id"], child_id);

    let (status, body) = srv.get(&format!("/categories/{b}/subcategories/by-slug/lids")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = srv.delete(&format!("/subcategories/{top_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, detached) = srv.get(&format!("/subcategories/{child_id}")).await;
    assert_eq!(detached["data"]["parent_subcategory_id"], Value::Null);

    let (status, _) = srv.get("/categories/999/subcategories").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn products_publish_checks_and_partial_updates() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv
        .post("/products", json!({ "name": "Bare", "category": "pumps", "status": "Active" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, draft) = srv.post("/products", json!({ "name": "Bare", "category": "pumps" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(draft["data"]["status"], "Draft");
    let draft_id = draft["data"]["id"].as_i64().unwrap();

    let (status, _) = srv.post("/products", publishable_pump("heaters")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = srv
        .patch(&format!("/products/{draft_id}"), json!({ "description": "Now described" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Now described");
    assert_eq!(body["data"]["name"], "Bare");
    assert_eq!(body["data"]["category"], "pumps");

    let (_, drafts) = srv.get("/products?status=draft").await;
    assert_eq!(drafts["data"].as_array().unwrap().len(), 1);
    let (_, heaters) = srv.get("/products?category=heaters").await;
    assert_eq!(heaters["data"][0]["name"], "VS Pump");
    let (_, found) = srv.get("/products?q=variable").await;
    assert_eq!(found["data"].as_array().unwrap().len(), 1);

    let (status, body) = srv.get("/products/not-a-number").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn leads_are_paginated_and_deleted_by_query_id() {
    let srv = TestServer::spawn().await;
    let mut ids = Vec::new();
    for name in ["Ann", "Bob", "Cid"] {
        let (status, body) = srv
            .post(
                "/leads",
                json!({ "name": name, "email": format!("{}@example.com", name.to_lowercase()), "phone": "555" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["data"]["id"].as_i64().unwrap());
    }

    let (status, body) = srv.get("/leads?page=1&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total_count"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["pagination"]["has_next_page"], true);
    assert_eq!(body["pagination"]["has_prev_page"], false);

    let (status, body) = srv.delete("/leads").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_id");

    let (status, _) = srv.delete(&format!("/leads?id={}", ids[0])).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = srv.delete(&format!("/leads?id={}", ids[0])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn newsletter_subscriptions_are_unique() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv.post("/newsletter-emails", json!({ "email": "Fan@Example.com" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "fan@example.com");

    let (status, _) = srv.post("/newsletter-emails", json!({ "email": "fan@example.com" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = srv.get("/newsletter-emails").await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn dashboard_reports_counts_and_recent_products() {
    let srv = TestServer::spawn().await;
    srv.post("/categories", json!({ "name": "Pumps" })).await;
    srv.post("/products", publishable_pump("pumps")).await;
    srv.post("/leads", json!({ "name": "Ann", "email": "ann@example.com" })).await;

    let (status, body) = srv.get("/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"]["stats"];
    assert_eq!(stats["total_products"], 1);
    assert_eq!(stats["total_categories"], 1);
    assert_eq!(stats["total_leads"], 1);
    assert_eq!(stats["total_media_files"], 1);
    assert_eq!(body["data"]["recent_products"][0]["name"], "VS Pump");
}

#[tokio::test]
async fn storage_upload_and_delete() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/storage/product-images?file_name=pump.png"))
        .bearer_auth(ADMIN_TOKEN)
        .header("content-type", "image/png")
        .body(vec![0u8; 64])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.contains("/storage/v1/object/public/product-images/"));
    assert!(url.ends_with(".png"));

    let res = srv
        .client
        .delete(srv.url("/storage/product-images"))
        .query(&[("url", url.as_str())])
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .post(srv.url("/storage/product-images?file_name=notes.txt"))
        .bearer_auth(ADMIN_TOKEN)
        .body(vec![1u8; 8])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .post(srv.url("/storage/product-images?file_name=huge.png"))
        .bearer_auth(ADMIN_TOKEN)
        .body(vec![0u8; 1024 * 1024 + 1])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let (status, body) = srv.delete("/storage/no-such-bucket?url=x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = srv.delete("/storage/product-images").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_url");
}

#[tokio::test]
async fn storage_upload_to_taken_object_name_conflicts() {
    let srv = TestServer::spawn().await;

    let upload = || {
        srv.client
            .post(srv.url("/storage/product-images?file_name=pump.png&object_name=fixed.png"))
            .bearer_auth(ADMIN_TOKEN)
            .header("content-type", "image/png")
            .body(vec![0u8; 16])
            .send()
    };

    let res = upload().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = upload().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "conflict");
}
