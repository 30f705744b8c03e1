//! Black-box tests of the product API over real TCP connections.

use product_sdk::{NewProduct, ProductClient};
use reqwest::StatusCode;

mod common;

#[tokio::test]
async fn list_returns_seed_products_as_json() {
    let server = common::start_server(common::local_config()).await;

    let res = reqwest::get(server.url()).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.headers().contains_key("x-request-id"));

    let products: serde_json::Value = res.json().await.unwrap();
    assert_eq!(products[0]["id"], 1);
    assert_eq!(products[0]["name"], "Latte");
    assert_eq!(products[0]["price"], 2.45);
    assert_eq!(products[1]["sku"], "fjd34");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn created_products_are_listed_in_insertion_order() {
    let server = common::start_server(common::local_config()).await;
    let client = ProductClient::new(&server.url());

    let tea = client.create(&NewProduct::new("Tea", 1.25, "tea-lea-f")).await.unwrap();
    let mocha = client.create(&NewProduct::new("Mocha", 3.40, "moc-ha-a")).await.unwrap();
    assert!(tea.id < mocha.id);
    assert_eq!(tea.id, 3);

    let names: Vec<String> = client.list().await.unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, ["Latte", "Espresso", "Tea", "Mocha"]);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn create_ignores_client_supplied_id() {
    let server = common::start_server(common::local_config()).await;

    let res = reqwest::Client::new()
        .post(server.url())
        .body(r#"{"id":1,"name":"Imposter","price":0.5,"sku":"imp"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["id"], 3);
    assert_eq!(server.store.get(1).unwrap().name, "Latte");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_id() {
    let server = common::start_server(common::local_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .put(format!("{}/2", server.url()))
        .body(r#"{"id":40,"name":"Doppio","description":"Two shots","price":2.2,"sku":"dop"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.bytes().await.unwrap().is_empty());

    let stored = server.store.get(2).unwrap();
    assert_eq!(stored.id, 2);
    assert_eq!(stored.name, "Doppio");
    assert_eq!(stored.description, "Two shots");
    assert!(server.store.get(40).is_err());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn update_status_codes() {
    let server = common::start_server(common::local_config()).await;
    let client = ProductClient::new(&server.url());
    let body = NewProduct::new("Ghost", 1.0, "gho");

    let err = client.update(12, &body).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    let raw = reqwest::Client::new();
    for path in ["/abc", "/", "/1/2"] {
        let res = raw
            .put(format!("{}{}", server.url(), path))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "PUT {path}");
    }

    assert_eq!(server.store.len(), 2);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn unknown_method_or_path_is_405() {
    let server = common::start_server(common::local_config()).await;
    let client = reqwest::Client::new();

    let res = client.delete(format!("{}/1", server.url())).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(res.bytes().await.unwrap().is_empty());

    let res = client.get(format!("{}/products", server.url())).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    server.stop().await.unwrap();
}
