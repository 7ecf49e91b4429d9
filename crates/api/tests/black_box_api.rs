use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use storefront_api::app::{build_order_app, build_product_app, OrderServices, ProductServices};
use storefront_infra::{HttpProductClient, InMemoryOrderStore};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(app: axum::Router) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Product service plus an order service wired to it over HTTP.
struct Stack {
    products: TestServer,
    orders: TestServer,
    client: reqwest::Client,
}

impl Stack {
    async fn spawn() -> Self {
        let products =
            TestServer::spawn(build_product_app(Arc::new(ProductServices::in_memory()))).await;
        let orders = spawn_order_service(&products.base_url).await;
        Self {
            products,
            orders,
            client: reqwest::Client::new(),
        }
    }

    async fn create_product(&self, name: &str, price: f64) -> serde_json::Value {
        let res = self
            .client
            .post(format!("{}/products", self.products.base_url))
            .json(&json!({ "name": name, "price": price }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn post_order(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/orders", self.orders.base_url))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn list_orders(&self) -> serde_json::Value {
        let res = self
            .client
            .get(format!("{}/orders", self.orders.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }
}

async fn spawn_order_service(product_base_url: &str) -> TestServer {
    let catalog = HttpProductClient::new(product_base_url, Duration::from_secs(2)).unwrap();
    let services = OrderServices::new(Arc::new(catalog), Arc::new(InMemoryOrderStore::new()));
    TestServer::spawn(build_order_app(Arc::new(services))).await
}

#[tokio::test]
async fn health_endpoints_respond() {
    let stack = Stack::spawn().await;
    for base in [&stack.products.base_url, &stack.orders.base_url] {
        let res = stack
            .client
            .get(format!("{}/health", base))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn product_create_then_lookup() {
    let stack = Stack::spawn().await;
    let created = stack.create_product("Gadget", 5.00).await;
    assert_eq!(created["name"], "Gadget");
    assert_eq!(created["price"].as_f64().unwrap(), 5.0);
    let id = created["id"].as_str().unwrap();

    let res = stack
        .client
        .get(format!("{}/products/{}", stack.products.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched, created);

    let all: serde_json::Value = stack
        .client
        .get(format!("{}/products", stack.products.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all, json!([created]));
}

#[tokio::test]
async fn unknown_product_lookup_is_null() {
    let stack = Stack::spawn().await;
    let res = stack
        .client
        .get(format!(
            "{}/products/{}",
            stack.products.base_url,
            uuid::Uuid::now_v7()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body.is_null());
}

#[tokio::test]
async fn malformed_product_id_is_bad_request() {
    let stack = Stack::spawn().await;
    let res = stack
        .client
        .get(format!("{}/products/not-a-uuid", stack.products.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn blank_product_name_is_rejected() {
    let stack = Stack::spawn().await;
    let res = stack
        .client
        .post(format!("{}/products", stack.products.base_url))
        .json(&json!({ "name": "   ", "price": 1.00 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn batch_lookup_returns_found_subset() {
    let stack = Stack::spawn().await;
    let a = stack.create_product("A", 1.00).await;
    let b = stack.create_product("B", 2.00).await;
    stack.create_product("C", 3.00).await;
    let missing = uuid::Uuid::now_v7();

    let ids = format!(
        "{},{},{}",
        a["id"].as_str().unwrap(),
        b["id"].as_str().unwrap(),
        missing
    );
    let res = stack
        .client
        .get(format!("{}/products/list", stack.products.base_url))
        .query(&[("ids", ids)])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(body.len(), 2);
    assert!(body.contains(&a));
    assert!(body.contains(&b));

    let empty: Vec<serde_json::Value> = stack
        .client
        .get(format!("{}/products/list?ids=", stack.products.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn order_snapshots_product_and_computes_total() {
    let stack = Stack::spawn().await;
    let widget = stack.create_product("Widget", 9.99).await;

    let res = stack
        .post_order(json!({ "items": [{ "productId": widget["id"], "quantity": 2 }] }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: serde_json::Value = res.json().await.unwrap();

    assert_eq!(order["total"].as_f64().unwrap(), 19.98);
    assert!(order["orderDate"].is_string());
    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productId"], widget["id"]);
    assert_eq!(items[0]["productName"], "Widget");
    assert_eq!(items[0]["price"].as_f64().unwrap(), 9.99);
    assert_eq!(items[0]["quantity"], 2);

    let res = stack
        .client
        .get(format!(
            "{}/orders/{}",
            stack.orders.base_url,
            order["id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched, order);
}

#[tokio::test]
async fn unknown_product_in_order_is_unprocessable_and_not_persisted() {
    let stack = Stack::spawn().await;
    let widget = stack.create_product("Widget", 9.99).await;
    let missing = uuid::Uuid::now_v7().to_string();

    let res = stack
        .post_order(json!({
            "items": [
                { "productId": widget["id"], "quantity": 1 },
                { "productId": missing, "quantity": 1 }
            ]
        }))
        .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "product_not_found");
    assert_eq!(body["productId"], missing);

    assert_eq!(stack.list_orders().await, json!([]));
}

#[tokio::test]
async fn order_listing_is_stable() {
    let stack = Stack::spawn().await;
    let widget = stack.create_product("Widget", 9.99).await;
    let gadget = stack.create_product("Gadget", 5.00).await;

    for product in [&widget, &gadget] {
        let res = stack
            .post_order(json!({ "items": [{ "productId": product["id"], "quantity": 1 }] }))
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let first = stack.list_orders().await;
    let second = stack.list_orders().await;
    assert_eq!(first.as_array().unwrap().len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn invalid_quantity_and_empty_order_are_bad_requests() {
    let stack = Stack::spawn().await;
    let widget = stack.create_product("Widget", 9.99).await;

    let res = stack
        .post_order(json!({ "items": [{ "productId": widget["id"], "quantity": 0 }] }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_quantity");

    let res = stack.post_order(json!({ "items": [] })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "empty_order");

    assert_eq!(stack.list_orders().await, json!([]));
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let stack = Stack::spawn().await;
    let res = stack
        .client
        .get(format!(
            "{}/orders/{}",
            stack.orders.base_url,
            uuid::Uuid::now_v7()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_service_down_is_service_unavailable() {
    // Grab a free port, then release it so nothing is listening there.
    let dead_addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let orders = spawn_order_service(&format!("http://{}", dead_addr)).await;

    let res = reqwest::Client::new()
        .post(format!("{}/orders", orders.base_url))
        .json(&json!({ "items": [{ "productId": uuid::Uuid::now_v7(), "quantity": 1 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "product_service_unavailable");
}

#[tokio::test]
async fn garbled_product_response_is_bad_gateway() {
    let stub = axum::Router::new().route("/products/list", axum::routing::get(|| async { "garbage" }));
    let products = TestServer::spawn(stub).await;
    let orders = spawn_order_service(&products.base_url).await;

    let res = reqwest::Client::new()
        .post(format!("{}/orders", orders.base_url))
        .json(&json!({ "items": [{ "productId": uuid::Uuid::now_v7(), "quantity": 1 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "bad_gateway");

    let listed: serde_json::Value = reqwest::Client::new()
        .get(format!("{}/orders", orders.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn repeated_ids_parameter_gets_json_error() {
    let stack = Stack::spawn().await;
    let res = stack
        .client
        .get(format!(
            "{}/products/list?ids=a&ids=b",
            stack.products.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_query");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn over_precise_price_is_rejected() {
    let stack = Stack::spawn().await;
    let res = stack
        .client
        .post(format!("{}/products", stack.products.base_url))
        .header("content-type", "application/json")
        .body(r#"{"name":"Widget","price":12345678.001}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");

    let all: serde_json::Value = stack
        .client
        .get(format!("{}/products", stack.products.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let stack = Stack::spawn().await;
    let res = stack
        .client
        .get(format!("{}/health", stack.products.base_url))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "abc-123");
}
