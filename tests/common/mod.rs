#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use uuid::Uuid;

use church_console_api::ai::{AiError, GenerateRequest, GenerativeModel};
use church_console_api::app::{router, AppState};
use church_console_api::auth::{generate_jwt, Claims};
use church_console_api::config::AppConfig;
use church_console_api::database::models::{Department, Profile};
use church_console_api::database::MemoryStore;
use church_console_api::sms::LoggingGateway;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const PRIMARY_MODEL: &str = "primary-model";
pub const BACKUP_MODEL: &str = "backup-model";

/// Answers per model name; unscripted models fail with a 500
#[derive(Default)]
pub struct ScriptedModel {
    answers: Mutex<HashMap<String, Result<String, AiError>>>,
    calls: Mutex<Vec<(String, GenerateRequest)>>,
}

impl ScriptedModel {
    pub fn answer(&self, model: &str, result: Result<&str, AiError>) {
        self.answers
            .lock()
            .unwrap()
            .insert(model.to_string(), result.map(str::to_string));
    }

    pub fn called_models(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.calls.lock().unwrap().last().map(|(_, r)| r.clone())
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String, AiError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));
        self.answers
            .lock()
            .unwrap()
            .get(model)
            .cloned()
            .unwrap_or_else(|| {
                Err(AiError::Upstream {
                    status: 500,
                    message: format!("no script for {}", model),
                })
            })
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub model: Arc<ScriptedModel>,
    pub config: AppConfig,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        let claims = Claims::new(user_id, None, 1);
        generate_jwt(&self.config.auth, &claims).expect("token")
    }

    pub async fn get(&self, path: &str, user: Uuid) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(self.token_for(user))
            .send()
            .await?)
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response> {
        Ok(self.client.post(self.url(path)).json(&body).send().await?)
    }
}

/// Router on a fresh in-memory store, served in-process on an unused port
pub async fn spawn_server() -> Result<TestServer> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("church_console_api=debug"))
        .with_test_writer()
        .try_init();

    let mut config = AppConfig::development();
    config.auth.jwt_secret = JWT_SECRET.to_string();
    config.ai.models = vec![PRIMARY_MODEL.to_string(), BACKUP_MODEL.to_string()];

    let store = Arc::new(MemoryStore::new());
    let model = Arc::new(ScriptedModel::default());
    let sms = Arc::new(LoggingGateway);
    let state = AppState::new(config.clone(), store.clone(), model.clone(), sms);

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    let app = router(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        model,
        config,
        client,
    })
}

pub fn profile(role: &str, admin_status: &str, church_id: Option<Uuid>) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        full_name: Some("관리자".into()),
        email: Some("admin@example.com".into()),
        phone: None,
        role: role.into(),
        admin_status: admin_status.into(),
        is_master: false,
        church_id,
        department_id: None,
    }
}

pub fn master() -> Profile {
    Profile {
        is_master: true,
        ..profile("member", "none", None)
    }
}

pub fn department(church_id: Uuid, name: &str) -> Department {
    Department {
        id: Uuid::new_v4(),
        name: name.into(),
        church_id,
    }
}
