use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use labtrack_auth::{JwtClaims, Role};
use labtrack_core::{UnitId, UserId};
use labtrack_infra::{AppConfig, InMemoryMailer};
use reqwest::StatusCode;
use serde_json::{json, Value};

const JWT_SECRET: &str = "black-box-secret";
const ADMIN_EMAIL: &str = "root@lab.example";
const ADMIN_PASSWORD: &str = "bootstrap-password";

struct TestServer {
    base_url: String,
    mailer: Arc<InMemoryMailer>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = AppConfig {
            jwt_secret: JWT_SECRET.to_string(),
            admin_email: ADMIN_EMAIL.to_string(),
            admin_password: Some(ADMIN_PASSWORD.to_string()),
            frontend_base_url: "http://frontend.test".to_string(),
            ..AppConfig::default()
        };
        let mailer = Arc::new(InMemoryMailer::new());

        // Same router as prod, bound to an ephemeral port.
        let app = labtrack_api::app::build_app_with_mailer(config, mailer.clone(), Utc::now())
            .await
            .expect("failed to build app");
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
            mailer,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Token carried by the last link mailed to `to`.
    fn mailed_token(&self, to: &str, marker: &str) -> String {
        let mail = self.mailer.last_to(to).expect("no mail sent");
        let start = mail.body.find(marker).expect("link not in mail body") + marker.len();
        mail.body[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(role: Role, unit: Option<&str>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        email: "minted@lab.example".to_string(),
        role,
        unit: unit.map(|u| UnitId::new(u).unwrap()),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn equipment_body(institutional_id: &str, unit: &str) -> Value {
    json!({
        "institutional_id": institutional_id,
        "name": "Centrifuge",
        "brand": "Eppendorf",
        "location_unit": unit,
        "last_maintenance_date": "2020-01-01",
        "maintenance_frequency": { "value": 6, "unit": "MONTHS" },
        "criticality": "HIGH"
    })
}

async fn login(client: &reqwest::Client, server: &TestServer, email: &str, password: &str) -> reqwest::Response {
    client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_public_and_everything_else_needs_a_token() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/equipment")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/whoami"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_the_token() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/whoami"))
        .bearer_auth(mint_jwt(Role::UnitManager, Some("genomics")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["role"], "UNIT_MANAGER");
    assert_eq!(body["unit"], "genomics");
}

#[tokio::test]
async fn equipment_is_scoped_to_the_callers_unit() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt(Role::Admin, None);
    let genomics = mint_jwt(Role::UnitManager, Some("genomics"));
    let technician = mint_jwt(Role::EquipmentManager, Some("genomics"));

    let res = client
        .post(server.url("/equipment"))
        .bearer_auth(&admin)
        .json(&equipment_body("GEN-001", "genomics"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["next_maintenance_date"], "2020-07-01");
    assert_eq!(created["status"], "Vencido");

    let res = client
        .post(server.url("/equipment"))
        .bearer_auth(&admin)
        .json(&equipment_body("CHE-001", "chemistry"))
        .send()
        .await
        .unwrap();
    let chemistry: Value = res.json().await.unwrap();

    // duplicate institutional id
    let res = client
        .post(server.url("/equipment"))
        .bearer_auth(&genomics)
        .json(&equipment_body("gen-001", "genomics"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .get(server.url("/equipment"))
        .bearer_auth(&genomics)
        .send()
        .await
        .unwrap();
    let listed: Vec<Value> = res.json().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["institutional_id"], "GEN-001");

    let res = client
        .get(server.url(&format!("/equipment/{}", chemistry["id"].as_str().unwrap())))
        .bearer_auth(&genomics)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    let res = client
        .post(server.url("/equipment"))
        .bearer_auth(&technician)
        .json(&equipment_body("GEN-002", "genomics"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(server.url("/equipment/exists/CHE-001"))
        .bearer_auth(&technician)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["exists"], true);

    let res = client
        .get(server.url("/equipment/not-a-uuid"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn issue_report_raises_a_notification() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt(Role::Admin, None);
    let technician = mint_jwt(Role::EquipmentManager, Some("genomics"));

    let res = client
        .post(server.url("/equipment"))
        .bearer_auth(&admin)
        .json(&equipment_body("GEN-001", "genomics"))
        .send()
        .await
        .unwrap();
    let equipment: Value = res.json().await.unwrap();
    let equipment_id = equipment["id"].as_str().unwrap().to_string();

    let res = client
        .post(server.url("/issues"))
        .bearer_auth(&technician)
        .json(&json!({
            "equipment_id": equipment_id,
            "reported_by": "Luis",
            "description": "Rotor is wobbling",
            "severity": "CRITICAL"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let report: Value = res.json().await.unwrap();
    assert_eq!(report["status"], "Abierto");

    let res = client
        .get(server.url(&format!("/equipment/{equipment_id}/issues")))
        .bearer_auth(&technician)
        .send()
        .await
        .unwrap();
    let reports: Vec<Value> = res.json().await.unwrap();
    assert_eq!(reports.len(), 1);

    let res = client
        .get(server.url("/notifications"))
        .bearer_auth(&technician)
        .send()
        .await
        .unwrap();
    let feed: Vec<Value> = res.json().await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["type"], "error");
    assert_eq!(feed[0]["read"], false);

    let res = client
        .put(server.url(&format!("/notifications/{}/read", feed[0]["id"].as_str().unwrap())))
        .bearer_auth(&technician)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(server.url(&format!("/notifications/{}", feed[0]["id"].as_str().unwrap())))
        .bearer_auth(&technician)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invited_user_activates_and_logs_in() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = login(&client, &server, ADMIN_EMAIL, "wrong-password-123").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = login(&client, &server, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
    let session: Value = res.json().await.unwrap();
    assert_eq!(session["user"]["must_change_password"], true);
    assert!(session["user"].get("credential_hash").is_none());
    let admin = session["token"].as_str().unwrap().to_string();

    let res = client
        .post(server.url("/users"))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Ana",
            "email": "ana@lab.example",
            "role": "UNIT_MANAGER",
            "unit": "genomics"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["user"]["enabled"], false);
    assert_eq!(created["invitation"]["delivered"], true);

    let invite = server.mailed_token("ana@lab.example", "/invite/");

    let res = client
        .get(server.url(&format!("/invitations/validate?token={invite}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let owner: Value = res.json().await.unwrap();
    assert_eq!(owner["email"], "ana@lab.example");

    let res = client
        .post(server.url("/invitations/activate"))
        .json(&json!({ "token": invite, "password": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(server.url("/invitations/activate"))
        .json(&json!({ "token": invite, "password": "correct-horse-battery" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // single use
    let res = client
        .post(server.url("/invitations/activate"))
        .json(&json!({ "token": invite, "password": "correct-horse-battery" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_or_expired_token");

    let res = login(&client, &server, "ana@lab.example", "correct-horse-battery").await;
    assert_eq!(res.status(), StatusCode::OK);
    let session: Value = res.json().await.unwrap();

    let res = client
        .get(server.url("/whoami"))
        .bearer_auth(session["token"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["email"], "ana@lab.example");
    assert_eq!(me["unit"], "genomics");
}

#[tokio::test]
async fn password_reset_round_trip() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/auth/forgot-password"))
        .json(&json!({ "email": "nobody@lab.example" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert!(server.mailer.sent().is_empty());

    let res = client
        .post(server.url("/auth/forgot-password"))
        .json(&json!({ "email": ADMIN_EMAIL }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let token = server.mailed_token(ADMIN_EMAIL, "reset-password?token=");

    let res = client
        .get(server.url(&format!("/auth/reset-password/validate?token={token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // a reset token is not an invitation
    let res = client
        .get(server.url(&format!("/invitations/validate?token={token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(server.url("/auth/reset-password"))
        .json(&json!({ "token": token, "password": "a-brand-new-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(
        login(&client, &server, ADMIN_EMAIL, ADMIN_PASSWORD).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login(&client, &server, ADMIN_EMAIL, "a-brand-new-password").await.status(),
        StatusCode::OK
    );
}
