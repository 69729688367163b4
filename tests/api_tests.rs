//! API integration tests.
//!
//! These run against a live server started with the default development
//! configuration (`cargo run`), hence the `#[ignore]` markers:
//! run with `cargo test -- --ignored`.

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};

use atelier_server::api::TechnicianClaims;

const BASE_URL: &str = "http://localhost:8080/api/v1";
const DEV_JWT_SECRET: &str = "change-this-secret-in-production";

/// Mint a session token the way the external auth layer does
fn auth_token() -> String {
    let now = Utc::now().timestamp();
    let claims = TechnicianClaims {
        sub: "tech".to_string(),
        technician_id: 1,
        name: "Technicien Test".to_string(),
        iat: now,
        exp: now + 3600,
    };
    claims.create_token(DEV_JWT_SECRET).expect("Failed to create token")
}

async fn create_client_record(client: &Client, token: &str) -> i64 {
    let response = client
        .post(format!("{}/clients", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "first_name": "Marie",
            "last_name": "Dupont",
            "phone": "0612345678"
        }))
        .send()
        .await
        .expect("Failed to create client");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse client");
    body["id"].as_i64().expect("No client ID")
}

async fn create_loaner(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post(format!("{}/loaner-devices", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "device_type": "Lave-linge",
            "condition": "Bon état"
        }))
        .send()
        .await
        .expect("Failed to create loaner device");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse loaner");
    assert_eq!(body["status"], "Disponible");
    body["id"].as_i64().expect("No loaner ID")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/interventions", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_client_phone_is_required() {
    let client = Client::new();
    let token = auth_token();

    let response = client
        .post(format!("{}/clients", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "first_name": "Sans",
            "last_name": "Téléphone",
            "phone": ""
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

/// Loan exclusivity: a loaner device can only carry one open loan, and
/// returning it makes it lendable again.
#[tokio::test]
#[ignore]
async fn test_loan_exclusivity_scenario() {
    let client = Client::new();
    let token = auth_token();

    let client1 = create_client_record(&client, &token).await;
    let client2 = create_client_record(&client, &token).await;
    let loaner = create_loaner(&client, &token, "Prêt LL-01").await;

    // First loan succeeds and marks the device Prêté
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "loaner_device_id": loaner, "client_id": client1 }))
        .send()
        .await
        .expect("Failed to open loan");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = body["id"].as_i64().expect("No loan ID");

    let device: Value = client
        .get(format!("{}/loaner-devices/{}", BASE_URL, loaner))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get loaner")
        .json()
        .await
        .expect("Failed to parse loaner");
    assert_eq!(device["status"], "Prêté");

    // Second open on the same device is rejected
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "loaner_device_id": loaner, "client_id": client2 }))
        .send()
        .await
        .expect("Failed to send second loan");
    assert_eq!(response.status(), 409);

    // Return: device becomes Disponible again
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&token)
        .json(&json!({ "condition_at_return": "Rayure capot" }))
        .send()
        .await
        .expect("Failed to return loan");
    assert_eq!(response.status(), 200);

    let device: Value = client
        .get(format!("{}/loaner-devices/{}", BASE_URL, loaner))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get loaner")
        .json()
        .await
        .expect("Failed to parse loaner");
    assert_eq!(device["status"], "Disponible");
    assert_eq!(device["condition"], "Rayure capot");

    // A second return of the same loan is rejected
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send second return");
    assert_eq!(response.status(), 409);

    // The device can now be lent to the second client
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "loaner_device_id": loaner, "client_id": client2 }))
        .send()
        .await
        .expect("Failed to reopen loan");
    assert_eq!(response.status(), 201);
}

/// Stock ledger: usage decrements stock atomically, never below zero, and
/// the alerts listing reflects the threshold before and after.
#[tokio::test]
#[ignore]
async fn test_part_stock_and_alerts_scenario() {
    let client = Client::new();
    let token = auth_token();

    let client_id = create_client_record(&client, &token).await;

    let reference = format!("CRR-{}", Utc::now().timestamp_millis());
    let response = client
        .post(format!("{}/parts", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "reference": reference,
            "designation": "Courroie 1192J5",
            "stock_quantity": 3,
            "min_quantity": 5,
            "sale_price": "24.90"
        }))
        .send()
        .await
        .expect("Failed to create part");
    assert_eq!(response.status(), 201);
    let part: Value = response.json().await.expect("Failed to parse part");
    let part_id = part["id"].as_i64().expect("No part ID");

    // Already under the minimum: listed in alerts
    let alerts: Value = client
        .get(format!("{}/parts/alerts", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get alerts")
        .json()
        .await
        .expect("Failed to parse alerts");
    assert!(alerts["parts"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"].as_i64() == Some(part_id)));

    let response = client
        .post(format!("{}/interventions", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "client_id": client_id,
            "device": { "kind": "ad_hoc", "device_type": "Sèche-linge" },
            "description": "Tambour bloqué"
        }))
        .send()
        .await
        .expect("Failed to create intervention");
    assert_eq!(response.status(), 201);
    let intervention: Value = response.json().await.expect("Failed to parse intervention");
    let intervention_id = intervention["id"].as_i64().expect("No intervention ID");

    // Consume one: stock 3 → 2, still in alert
    let response = client
        .post(format!("{}/interventions/{}/parts", BASE_URL, intervention_id))
        .bearer_auth(&token)
        .json(&json!({ "part_id": part_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to record usage");
    assert_eq!(response.status(), 201);

    let part: Value = client
        .get(format!("{}/parts/{}", BASE_URL, part_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get part")
        .json()
        .await
        .expect("Failed to parse part");
    assert_eq!(part["stock_quantity"], 2);

    let alerts: Value = client
        .get(format!("{}/parts/alerts", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get alerts")
        .json()
        .await
        .expect("Failed to parse alerts");
    assert!(alerts["parts"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"].as_i64() == Some(part_id)));

    // Requesting more than the remaining stock fails and changes nothing
    let response = client
        .post(format!("{}/interventions/{}/parts", BASE_URL, intervention_id))
        .bearer_auth(&token)
        .json(&json!({ "part_id": part_id, "quantity": 10 }))
        .send()
        .await
        .expect("Failed to send oversized usage");
    assert_eq!(response.status(), 422);

    let part: Value = client
        .get(format!("{}/parts/{}", BASE_URL, part_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get part")
        .json()
        .await
        .expect("Failed to parse part");
    assert_eq!(part["stock_quantity"], 2);
}

/// Workflow walk: all seven statuses in order, with the total recomputed
/// from labor and part usages along the way.
#[tokio::test]
#[ignore]
async fn test_intervention_status_walk_and_total_cost() {
    let client = Client::new();
    let token = auth_token();

    let client_id = create_client_record(&client, &token).await;

    let response = client
        .post(format!("{}/clients/{}/devices", BASE_URL, client_id))
        .bearer_auth(&token)
        .json(&json!({
            "device_type": "Four",
            "brand": "Solde",
            "model": "F-200",
            "serial_number": "SN-0042"
        }))
        .send()
        .await
        .expect("Failed to create device");
    assert_eq!(response.status(), 201);
    let device: Value = response.json().await.expect("Failed to parse device");
    let device_id = device["id"].as_i64().expect("No device ID");

    let response = client
        .post(format!("{}/interventions", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "client_id": client_id,
            "device": { "kind": "registered", "device_id": device_id },
            "description": "Ne chauffe plus"
        }))
        .send()
        .await
        .expect("Failed to create intervention");
    assert_eq!(response.status(), 201);
    let intervention: Value = response.json().await.expect("Failed to parse intervention");
    let intervention_id = intervention["id"].as_i64().expect("No intervention ID");
    assert_eq!(intervention["status"], "Demande");
    assert!(intervention["reference"].as_str().unwrap().starts_with("INT-"));

    // Deleting the registered device while referenced must fail
    let response = client
        .delete(format!("{}/clients/{}/devices/{}", BASE_URL, client_id, device_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send device delete");
    assert_eq!(response.status(), 409);

    // Two part usages
    for (qty, price) in [(2, "10.00"), (1, "5.50")] {
        let reference = format!("RES-{}-{}", Utc::now().timestamp_millis(), qty);
        let part: Value = client
            .post(format!("{}/parts", BASE_URL))
            .bearer_auth(&token)
            .json(&json!({
                "reference": reference,
                "designation": "Résistance",
                "stock_quantity": 10,
                "min_quantity": 1,
                "sale_price": price
            }))
            .send()
            .await
            .expect("Failed to create part")
            .json()
            .await
            .expect("Failed to parse part");
        let response = client
            .post(format!("{}/interventions/{}/parts", BASE_URL, intervention_id))
            .bearer_auth(&token)
            .json(&json!({ "part_id": part["id"], "quantity": qty }))
            .send()
            .await
            .expect("Failed to record usage");
        assert_eq!(response.status(), 201);
    }

    // Labor: 1.5 h at 60 €/h
    let response = client
        .put(format!("{}/interventions/{}", BASE_URL, intervention_id))
        .bearer_auth(&token)
        .json(&json!({ "labor_hours": "1.5", "hourly_rate": "60" }))
        .send()
        .await
        .expect("Failed to set labor");
    assert_eq!(response.status(), 200);

    for status in [
        "Planifié",
        "En cours",
        "Diagnostic",
        "Réparation",
        "Terminé",
        "Facturé",
    ] {
        let response = client
            .put(format!("{}/interventions/{}", BASE_URL, intervention_id))
            .bearer_auth(&token)
            .json(&json!({ "status": status }))
            .send()
            .await
            .expect("Failed to update status");
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.expect("Failed to parse intervention");
        assert_eq!(body["status"], status);
    }

    let body: Value = client
        .get(format!("{}/interventions/{}", BASE_URL, intervention_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get intervention")
        .json()
        .await
        .expect("Failed to parse intervention");

    // 1.5 × 60 + 2 × 10.00 + 1 × 5.50
    assert_eq!(body["total_cost"], "115.50");
    assert!(!body["completed_date"].is_null());

    // Paginated status filter includes the invoiced intervention
    let listing: Value = client
        .get(format!("{}/interventions?status=Facturé&per_page=50", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to list interventions")
        .json()
        .await
        .expect("Failed to parse listing");
    assert!(listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|i| i["id"].as_i64() == Some(intervention_id)));
}

/// Deposit commit is all-or-nothing. The development configuration points
/// the document generator at an unreachable port, so the commit must fail
/// with 502 and leave the intervention untouched.
#[tokio::test]
#[ignore]
async fn test_deposit_commit_atomic_on_generator_failure() {
    let client = Client::new();
    let token = auth_token();

    let client_id = create_client_record(&client, &token).await;

    let response = client
        .post(format!("{}/interventions", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "client_id": client_id,
            "device": { "kind": "ad_hoc", "device_type": "Lave-vaisselle" },
            "intervention_type": "Atelier",
            "description": "Fuite en bas de porte"
        }))
        .send()
        .await
        .expect("Failed to create intervention");
    let intervention: Value = response.json().await.expect("Failed to parse intervention");
    let intervention_id = intervention["id"].as_i64().expect("No intervention ID");

    // Deposit requires status Planifié
    let response = client
        .put(format!("{}/interventions/{}", BASE_URL, intervention_id))
        .bearer_auth(&token)
        .json(&json!({ "status": "Planifié" }))
        .send()
        .await
        .expect("Failed to plan intervention");
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/interventions/{}/deposit", BASE_URL, intervention_id))
        .bearer_auth(&token)
        .json(&json!({
            "photos": ["intake-1.jpg", "intake-2.jpg"],
            "accessories": ["Panier", "Notice"]
        }))
        .send()
        .await
        .expect("Failed to send deposit");
    assert_eq!(response.status(), 502);

    // Nothing was persisted
    let body: Value = client
        .get(format!("{}/interventions/{}", BASE_URL, intervention_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get intervention")
        .json()
        .await
        .expect("Failed to parse intervention");
    assert!(body["deposit"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_deposit_rejected_outside_planned_status() {
    let client = Client::new();
    let token = auth_token();

    let client_id = create_client_record(&client, &token).await;

    let response = client
        .post(format!("{}/interventions", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "client_id": client_id,
            "device": { "kind": "ad_hoc", "device_type": "Micro-ondes" },
            "description": "Plateau ne tourne plus"
        }))
        .send()
        .await
        .expect("Failed to create intervention");
    let intervention: Value = response.json().await.expect("Failed to parse intervention");

    // Still in Demande: deposit is refused before any collaborator call
    let response = client
        .post(format!(
            "{}/interventions/{}/deposit",
            BASE_URL,
            intervention["id"].as_i64().unwrap()
        ))
        .bearer_auth(&token)
        .json(&json!({ "photos": [], "accessories": [] }))
        .send()
        .await
        .expect("Failed to send deposit");
    assert_eq!(response.status(), 409);
}

/// Deleting a loaner device with an open loan must fail; deleting an
/// intervention referenced by an open loan must fail too.
#[tokio::test]
#[ignore]
async fn test_delete_guards_on_open_loan() {
    let client = Client::new();
    let token = auth_token();

    let client_id = create_client_record(&client, &token).await;
    let loaner = create_loaner(&client, &token, "Prêt SL-07").await;

    let response = client
        .post(format!("{}/interventions", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "client_id": client_id,
            "device": { "kind": "ad_hoc", "device_type": "Lave-linge" },
            "description": "Essorage bruyant"
        }))
        .send()
        .await
        .expect("Failed to create intervention");
    let intervention: Value = response.json().await.expect("Failed to parse intervention");
    let intervention_id = intervention["id"].as_i64().expect("No intervention ID");

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "loaner_device_id": loaner,
            "client_id": client_id,
            "intervention_id": intervention_id
        }))
        .send()
        .await
        .expect("Failed to open loan");
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = loan["id"].as_i64().expect("No loan ID");

    let response = client
        .delete(format!("{}/loaner-devices/{}", BASE_URL, loaner))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send loaner delete");
    assert_eq!(response.status(), 409);

    let response = client
        .delete(format!("{}/interventions/{}", BASE_URL, intervention_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send intervention delete");
    assert_eq!(response.status(), 409);

    // After the return both deletions go through
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to return loan");
    assert_eq!(response.status(), 200);

    let response = client
        .delete(format!("{}/interventions/{}", BASE_URL, intervention_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete intervention");
    assert_eq!(response.status(), 204);
}

/// Manual loaner status edits: Prêté is never settable by hand, and a
/// device with an open loan cannot be toggled at all.
#[tokio::test]
#[ignore]
async fn test_loaner_status_override_rules() {
    let client = Client::new();
    let token = auth_token();

    let loaner = create_loaner(&client, &token, "Prêt RF-03").await;

    let response = client
        .put(format!("{}/loaner-devices/{}", BASE_URL, loaner))
        .bearer_auth(&token)
        .json(&json!({ "status": "Prêté" }))
        .send()
        .await
        .expect("Failed to send status update");
    assert_eq!(response.status(), 400);

    let response = client
        .put(format!("{}/loaner-devices/{}", BASE_URL, loaner))
        .bearer_auth(&token)
        .json(&json!({ "status": "En maintenance" }))
        .send()
        .await
        .expect("Failed to send status update");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse loaner");
    assert_eq!(body["status"], "En maintenance");

    // Not available for loans while in maintenance
    let available: Value = client
        .get(format!("{}/loaner-devices/available", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to list available")
        .json()
        .await
        .expect("Failed to parse available");
    assert!(!available
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["id"].as_i64() == Some(loaner)));
}
