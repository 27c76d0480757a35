//! Shared helpers for driving the router in-process with a cookie-carrying client.

#![allow(dead_code)]

use std::net::IpAddr;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

use minigame_arcade::config::{Config, Environment};
use minigame_arcade::state::AppState;

/// Application wired to a fresh in-memory `SQLite` database.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_in(Environment::Development).await
}

/// Like [`spawn_app`], with the CORS layer `main` installs for `environment`.
pub async fn spawn_app_in(environment: Environment) -> TestApp {
    let db = minigame_arcade::db::connect("sqlite::memory:")
        .await
        .unwrap_or_default();
    Migrator::up(&db, None).await.unwrap_or_default();

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: IpAddr::from([127, 0, 0, 1]),
        server_port: 0,
        environment,
        log_level: "debug".to_string(),
        site_url: "https://arcade.example".to_string(),
        session_ttl_hours: 1,
        admin_password: "admin123".to_string(),
    };
    let cors = minigame_arcade::routes::cors_layer(&config);
    let state = AppState {
        db: db.clone(),
        config,
    };

    TestApp {
        router: minigame_arcade::routes::app(state).layer(cors),
        db,
    }
}

impl TestApp {
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_default()
    }

    /// Categories of the flash messages on a rendered page.
    pub fn flash_categories(&self) -> Vec<String> {
        self.json()["flash"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|f| f["category"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A browser stand-in that remembers the session cookie between requests.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self
            .request("GET", uri)
            .body(Body::empty())
            .unwrap_or_default();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap_or_default();
        self.send(request).await
    }

    pub async fn post_json(&mut self, uri: &str, body: &Value) -> TestResponse {
        self.post_raw_json(uri, body.to_string()).await
    }

    pub async fn post_raw_json(&mut self, uri: &str, body: String) -> TestResponse {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap_or_default();
        self.send(request).await
    }

    /// CORS preflight for `uri` as sent by a page served from `origin`.
    pub async fn preflight(&mut self, uri: &str, origin: &str) -> TestResponse {
        let request = self
            .request("OPTIONS", uri)
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap_or_default();
        self.send(request).await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap_or_default();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            self.cookie = if set_cookie.contains("Max-Age=0") {
                None
            } else {
                set_cookie.split(';').next().map(str::to_string)
            };
        }

        let status = response.status();
        let headers = response.headers().clone();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .into_body()
            .collect()
            .await
            .map(http_body_util::Collected::to_bytes)
            .unwrap_or_default();

        TestResponse {
            status,
            location,
            headers,
            body: String::from_utf8(body.to_vec()).unwrap_or_default(),
        }
    }

    /// Register without a phone number, log in and land on the home page.
    pub async fn sign_up_and_log_in(&mut self, username: &str) -> TestResponse {
        let email = format!("{username}@example.com");
        self.post_form(
            "/register",
            &[
                ("username", username),
                ("email", &email),
                ("password", "hunter22"),
                ("confirm_password", "hunter22"),
            ],
        )
        .await;
        let logged_in = self
            .post_form(
                "/login",
                &[("username", username), ("password", "hunter22")],
            )
            .await;
        // Drain the welcome flashes so later pages start clean.
        self.get("/").await;
        logged_in
    }
}
