//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use catalog_core::{
  service::Catalog,
  user::{NewUser, Role},
};
use catalog_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{api_router, auth::hash_password};

const PASSWORD: &str = "hunter2hunter2";

async fn app() -> (Router, Arc<Catalog<SqliteStore>>) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let catalog = Arc::new(Catalog::new(store));
  (api_router(catalog.clone()), catalog)
}

/// Register directly through the catalog; the API refuses admin sign-ups.
async fn seed(catalog: &Catalog<SqliteStore>, email: &str, role: Role) {
  catalog
    .register_user(NewUser {
      email: email.to_owned(),
      password_hash: hash_password(PASSWORD).unwrap(),
      role,
    })
    .await
    .unwrap();
}

async fn send(
  app:    &Router,
  method: &str,
  uri:    &str,
  user:   Option<&str>,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(email) = user {
    let creds = B64.encode(format!("{email}:{PASSWORD}"));
    builder = builder.header(header::AUTHORIZATION, format!("Basic {creds}"));
  }
  let req = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, json)
}

/// Admin, seller and buyer accounts plus one category and one product.
async fn shop() -> (Router, Arc<Catalog<SqliteStore>>, String) {
  let (app, catalog) = app().await;
  seed(&catalog, "admin@example.com", Role::Admin).await;
  seed(&catalog, "seller@example.com", Role::Seller).await;
  seed(&catalog, "ana@example.com", Role::Buyer).await;
  seed(&catalog, "bo@example.com", Role::Buyer).await;

  let (status, category) = send(
    &app,
    "POST",
    "/categories",
    Some("admin@example.com"),
    Some(json!({ "name": "Kitchen" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, product) = send(
    &app,
    "POST",
    "/products",
    Some("seller@example.com"),
    Some(json!({
      "name": "Cast iron pan",
      "price": "39.90",
      "stock": 4,
      "category_id": category["category_id"],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{product}");

  let product_id = product["product_id"].as_str().unwrap().to_owned();
  (app, catalog, product_id)
}

// ── Users ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_hides_hash_and_rejects_duplicates() {
  let (app, _) = app().await;
  let body = json!({ "email": "cy@example.com", "password": PASSWORD, "role": "buyer" });

  let (status, user) = send(&app, "POST", "/users", None, Some(body.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(user["role"], "buyer");
  assert!(user.get("password_hash").is_none());

  let (status, _) = send(&app, "POST", "/users", None, Some(body)).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_validates_fields() {
  let (app, _) = app().await;
  let cases = [
    json!({ "email": "not-an-email", "password": PASSWORD, "role": "buyer" }),
    json!({ "email": "cy@example.com", "password": "short", "role": "buyer" }),
    json!({ "email": "cy@example.com", "password": PASSWORD, "role": "admin" }),
  ];
  for body in cases {
    let (status, err) = send(&app, "POST", "/users", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{err}");
    assert!(err["error"].is_string());
  }
}

#[tokio::test]
async fn deactivated_user_can_no_longer_authenticate() {
  let (app, catalog, _) = shop().await;
  let ana = catalog
    .find_user_by_email("ana@example.com")
    .await
    .unwrap()
    .unwrap();

  let uri = format!("/users/{}", ana.user_id);
  let (status, _) = send(&app, "DELETE", &uri, Some("bo@example.com"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, user) = send(&app, "DELETE", &uri, Some("admin@example.com"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(user["lifecycle"], "inactive");

  let (status, _) = send(
    &app,
    "POST",
    "/categories",
    Some("ana@example.com"),
    Some(json!({ "name": "Garden" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credentials_get_a_challenge() {
  let (app, _) = app().await;
  let req = Request::builder()
    .method("POST")
    .uri("/categories")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(json!({ "name": "Garden" }).to_string()))
    .unwrap();

  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Basic realm=\"catalog\"");
}

// ── Categories and products ──────────────────────────────────────────────────

#[tokio::test]
async fn only_admins_manage_categories() {
  let (app, _, _) = shop().await;
  for who in ["seller@example.com", "ana@example.com"] {
    let (status, _) = send(
      &app,
      "POST",
      "/categories",
      Some(who),
      Some(json!({ "name": "Garden" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }
}

#[tokio::test]
async fn product_writes_are_validated() {
  let (app, catalog, _) = shop().await;
  let category_id = catalog.list_categories().await.unwrap()[0].category_id;
  let seller = Some("seller@example.com");

  let bad = [
    json!({ "name": "Pa", "price": "1.00", "stock": 1, "category_id": category_id }),
    json!({ "name": "Pan", "price": "1.005", "stock": 1, "category_id": category_id }),
    json!({ "name": "Pan", "price": "0", "stock": 1, "category_id": category_id }),
    json!({ "name": "Pan", "price": "1.00", "stock": 1, "category_id": uuid::Uuid::new_v4() }),
  ];
  for body in bad {
    let (status, err) = send(&app, "POST", "/products", seller, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{err}");
  }
}

#[tokio::test]
async fn product_stock_is_required() {
  let (app, catalog, _) = shop().await;
  let category_id = catalog.list_categories().await.unwrap()[0].category_id;

  let (status, _) = send(
    &app,
    "POST",
    "/products",
    Some("seller@example.com"),
    Some(json!({ "name": "Lid", "price": "5.00", "category_id": category_id })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(catalog.list_products(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn retired_category_blocks_products_and_retired_product_is_hidden() {
  let (app, catalog, product_id) = shop().await;
  let category_id = catalog.list_categories().await.unwrap()[0].category_id;

  let (status, _) = send(
    &app,
    "DELETE",
    &format!("/categories/{category_id}"),
    Some("admin@example.com"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(
    &app,
    "POST",
    "/products",
    Some("seller@example.com"),
    Some(json!({ "name": "Wok", "price": "25.00", "stock": 2, "category_id": category_id })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  // The existing product is untouched by the category's deactivation.
  let uri = format!("/products/{product_id}");
  let (status, _) = send(&app, "GET", &uri, None, None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(&app, "DELETE", &uri, Some("seller@example.com"), None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = send(&app, "GET", &uri, None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, "DELETE", &uri, Some("seller@example.com"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn products_filter_by_category() {
  let (app, _, product_id) = shop().await;
  let (_, other) = send(
    &app,
    "POST",
    "/categories",
    Some("admin@example.com"),
    Some(json!({ "name": "Garden" })),
  )
  .await;

  let (_, all) = send(&app, "GET", "/products", None, None).await;
  assert_eq!(all.as_array().unwrap().len(), 1);

  let uri = format!("/products?category_id={}", other["category_id"].as_str().unwrap());
  let (status, filtered) = send(&app, "GET", &uri, None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(filtered.as_array().unwrap().is_empty());

  assert_eq!(all[0]["product_id"], product_id.as_str());
}

// ── Reviews ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn review_lifecycle_drives_product_rating() {
  let (app, _, product_id) = shop().await;
  let product_uri = format!("/products/{product_id}");
  let review = |grade: u8| json!({ "product_id": product_id, "comment": "good pan", "grade": grade });

  let (status, first) =
    send(&app, "POST", "/reviews", Some("ana@example.com"), Some(review(5))).await;
  assert_eq!(status, StatusCode::CREATED);
  let (_, product) = send(&app, "GET", &product_uri, None, None).await;
  assert_eq!(product["rating"], 5.0);

  let (status, _) =
    send(&app, "POST", "/reviews", Some("ana@example.com"), Some(review(1))).await;
  assert_eq!(status, StatusCode::CONFLICT);

  send(&app, "POST", "/reviews", Some("bo@example.com"), Some(review(3))).await;
  let (_, product) = send(&app, "GET", &product_uri, None, None).await;
  assert_eq!(product["rating"], 4.0);

  let review_uri = format!("/reviews/{}", first["review_id"].as_str().unwrap());
  let (status, _) = send(&app, "DELETE", &review_uri, Some("bo@example.com"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&app, "DELETE", &review_uri, Some("admin@example.com"), None).await;
  assert_eq!(status, StatusCode::OK);
  let (_, product) = send(&app, "GET", &product_uri, None, None).await;
  assert_eq!(product["rating"], 3.0);

  // Inactive reviews stay readable by id but drop out of listings.
  let (status, audit) = send(&app, "GET", &review_uri, None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(audit["lifecycle"], "inactive");

  let (_, listed) = send(&app, "GET", &format!("{product_uri}/reviews"), None, None).await;
  assert_eq!(listed.as_array().unwrap().len(), 1);
  let (_, all) = send(&app, "GET", "/reviews", None, None).await;
  assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn review_body_is_validated() {
  let (app, _, product_id) = shop().await;
  let bad = [
    json!({ "product_id": product_id, "comment": "meh", "grade": 6 }),
    json!({ "product_id": product_id, "comment": "meh", "grade": 0 }),
    json!({ "product_id": product_id, "comment": "", "grade": 3 }),
  ];
  for body in bad {
    let (status, _) = send(&app, "POST", "/reviews", Some("ana@example.com"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}

#[tokio::test]
async fn sellers_cannot_review() {
  let (app, _, product_id) = shop().await;
  let (status, _) = send(
    &app,
    "POST",
    "/reviews",
    Some("seller@example.com"),
    Some(json!({ "product_id": product_id, "comment": "buy it", "grade": 5 })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}
