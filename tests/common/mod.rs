#![allow(dead_code)]

use actix_web::{http::Method, test, web, App};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use once_cell::sync::Lazy;
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use expense_ledger::auth::TokenClaims;
use expense_ledger::configure_routes;
use expense_ledger::expense::filter::ReportingOffset;
use expense_ledger::store::{ExpenseStore, InMemoryStore};

static JWT_SECRET: &str = "test_jwt_secret_for_integration_tests";

static SECRET: Lazy<Secret<String>> = Lazy::new(|| Secret::new(JWT_SECRET.to_string()));

/// Mint an access token the way the identity service would
pub fn token_for(user_id: Uuid) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(15)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode test token")
}

/// A caller with their own token
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            token: token_for(id),
        }
    }
}

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub reporting: ReportingOffset,
}

pub struct TestResponse {
    status: u16,
    body: bytes::Bytes,
}

impl TestResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub async fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }
}

impl TestApp {
    pub async fn new() -> Self {
        TestApp {
            store: Arc::new(InMemoryStore::new()),
            reporting: ReportingOffset::default(),
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: &str, payload: &Value) -> TestResponse {
        self.send(Method::POST, path, Some(token), Some(payload))
            .await
    }

    pub async fn put(&self, path: &str, token: &str, payload: &Value) -> TestResponse {
        self.send(Method::PUT, path, Some(token), Some(payload))
            .await
    }

    pub async fn patch(&self, path: &str, token: &str, payload: &Value) -> TestResponse {
        self.send(Method::PATCH, path, Some(token), Some(payload))
            .await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        payload: Option<&Value>,
    ) -> TestResponse {
        let store: Arc<dyn ExpenseStore> = self.store.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .app_data(web::Data::new(self.reporting))
                .app_data(web::Data::new(SECRET.clone()))
                .configure(configure_routes),
        )
        .await;

        let mut req = test::TestRequest::default().method(method).uri(path);
        if let Some(token) = token {
            req = req.insert_header(("Authorization", format!("Bearer {token}")));
        }
        if let Some(payload) = payload {
            req = req.set_json(payload);
        }

        let resp = test::call_service(&app, req.to_request()).await;

        let status = resp.status().as_u16();
        let body = test::read_body(resp).await;

        TestResponse { status, body }
    }

    /// Create a category through the API and return its id
    pub async fn create_category(&self, user: &TestUser, name: &str, budget: &str) -> String {
        let response = self
            .post(
                "/categories",
                &user.token,
                &serde_json::json!({ "name": name, "budget": budget }),
            )
            .await;
        assert_eq!(response.status(), 201, "category creation failed");
        response.json().await["id"]
            .as_str()
            .expect("category id")
            .to_string()
    }

    /// Create a payment method through the API and return its id
    pub async fn create_payment_method(&self, user: &TestUser, name: &str) -> String {
        let response = self
            .post(
                "/payment-methods",
                &user.token,
                &serde_json::json!({ "name": name }),
            )
            .await;
        assert_eq!(response.status(), 201, "payment method creation failed");
        response.json().await["id"]
            .as_str()
            .expect("payment method id")
            .to_string()
    }
}
