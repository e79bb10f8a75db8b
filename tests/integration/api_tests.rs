//! API integration tests
//!
//! Need a running server and a seeded assistant account:
//! `GUILD_TEST_STAFF_EMAIL` / `GUILD_TEST_STAFF_PASSWORD`
//! (defaults `assistant@guild.test` / `assistant`).

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:3000/api";

fn staff_credentials() -> (String, String) {
    let email = std::env::var("GUILD_TEST_STAFF_EMAIL").unwrap_or_else(|_| "assistant@guild.test".to_string());
    let password = std::env::var("GUILD_TEST_STAFF_PASSWORD").unwrap_or_else(|_| "assistant".to_string());
    (email, password)
}

/// Log in and return the bearer token
async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access_token"].as_str().expect("No token in response").to_string()
}

async fn staff_token(client: &Client) -> String {
    let (email, password) = staff_credentials();
    login(client, &email, &password).await
}

/// Register a fresh client account and log in with it
async fn client_token(client: &Client) -> String {
    let email = format!("client-{}@guild.test", Uuid::new_v4());
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "email": email, "password": "secret-pass", "name": "Test Client" }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(response.status(), StatusCode::CREATED);

    login(client, &email, "secret-pass").await
}

async fn send_json(
    request: reqwest::RequestBuilder,
    token: &str,
    expected: StatusCode,
) -> Value {
    let response = request.bearer_auth(token).send().await.expect("Failed to send request");
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    assert_eq!(status, expected, "unexpected status, body: {}", body);
    body
}

async fn create_named(client: &Client, token: &str, resource: &str) -> i64 {
    let body = send_json(
        client
            .post(format!("{}/{}", BASE_URL, resource))
            .json(&json!({ "name": format!("{}-{}", resource, Uuid::new_v4()) })),
        token,
        StatusCode::CREATED,
    )
    .await;
    body["id"].as_i64().expect("id")
}

async fn create_adventurer(client: &Client, token: &str, daily_rate: i64) -> i64 {
    let speciality_id = create_named(client, token, "specialities").await;
    let body = send_json(
        client.post(format!("{}/adventurers", BASE_URL)).json(&json!({
            "name": format!("Adventurer {}", Uuid::new_v4()),
            "specialityId": speciality_id,
            "dailyRate": daily_rate,
            "experience": 100,
        })),
        token,
        StatusCode::CREATED,
    )
    .await;
    body["id"].as_i64().expect("adventurer id")
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": "nobody@guild.test", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["path"], "/api/auth/login");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/quests", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_verify_reports_role() {
    let client = Client::new();
    let staff = staff_token(&client).await;
    let customer = client_token(&client).await;

    let body = send_json(client.get(format!("{}/auth/verify", BASE_URL)), &staff, StatusCode::OK).await;
    assert_eq!(body["roleId"], 1);

    let body = send_json(client.get(format!("{}/auth/verify", BASE_URL)), &customer, StatusCode::OK).await;
    assert_eq!(body["roleId"], 2);
}

#[tokio::test]
#[ignore]
async fn test_client_cannot_read_finances() {
    let client = Client::new();
    let token = client_token(&client).await;

    send_json(
        client.get(format!("{}/finances/balance", BASE_URL)),
        &token,
        StatusCode::FORBIDDEN,
    )
    .await;
}

#[tokio::test]
#[ignore]
async fn test_reference_crud() {
    let client = Client::new();
    let token = staff_token(&client).await;

    let name = format!("Ranger {}", Uuid::new_v4());
    let created = send_json(
        client.post(format!("{}/specialities", BASE_URL)).json(&json!({ "name": name })),
        &token,
        StatusCode::CREATED,
    )
    .await;
    let id = created["id"].as_i64().expect("id");

    // Duplicate name
    send_json(
        client.post(format!("{}/specialities", BASE_URL)).json(&json!({ "name": name })),
        &token,
        StatusCode::CONFLICT,
    )
    .await;

    let renamed = send_json(
        client
            .patch(format!("{}/specialities/{}", BASE_URL, id))
            .json(&json!({ "name": format!("{} (veteran)", name) })),
        &token,
        StatusCode::OK,
    )
    .await;
    assert!(renamed["name"].as_str().unwrap().ends_with("(veteran)"));

    send_json(
        client.delete(format!("{}/specialities/{}", BASE_URL, id)),
        &token,
        StatusCode::NO_CONTENT,
    )
    .await;
    send_json(
        client.get(format!("{}/specialities/{}", BASE_URL, id)),
        &token,
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
#[ignore]
async fn test_finances_transactions() {
    let client = Client::new();
    let token = staff_token(&client).await;

    let balance = send_json(client.get(format!("{}/finances/balance", BASE_URL)), &token, StatusCode::OK).await;
    assert!(balance["balance"].is_i64());

    let entry = send_json(
        client
            .post(format!("{}/finances/transactions", BASE_URL))
            .json(&json!({ "amount": 250, "description": "Donation" })),
        &token,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(entry["amount"], 250);

    send_json(
        client
            .post(format!("{}/finances/transactions", BASE_URL))
            .json(&json!({ "amount": 0, "description": "Nothing" })),
        &token,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let history = send_json(
        client.get(format!("{}/finances/history?take=500", BASE_URL)),
        &token,
        StatusCode::OK,
    )
    .await;
    assert_eq!(history["take"], 100);
    assert!(history["totalCount"].as_i64().unwrap() >= 1);
    let ids: Vec<&Value> = history["transactions"]
        .as_array()
        .expect("transactions")
        .iter()
        .map(|t| &t["id"])
        .collect();
    assert!(ids.contains(&&entry["id"]));

    let statistics = send_json(client.get(format!("{}/finances/statistics", BASE_URL)), &token, StatusCode::OK).await;
    assert!(statistics["totalIncome"].as_i64().unwrap() >= 250);
}

#[tokio::test]
#[ignore]
async fn test_rest_periods_and_schedule() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let adventurer_id = create_adventurer(&client, &token, 10).await;

    let start = Utc::now() + Duration::days(30);
    let end = start + Duration::days(3);

    let rest = send_json(
        client.post(format!("{}/adventurer-availability/rests", BASE_URL)).json(&json!({
            "adventurerId": adventurer_id,
            "startDate": start,
            "endDate": end,
            "reason": "Annual leave",
            "type": "rest",
        })),
        &token,
        StatusCode::CREATED,
    )
    .await;

    // Overlapping period is rejected
    send_json(
        client.post(format!("{}/adventurer-availability/rests", BASE_URL)).json(&json!({
            "adventurerId": adventurer_id,
            "startDate": start + Duration::days(1),
            "endDate": end + Duration::days(1),
            "reason": "Injury",
            "type": "unavailable",
        })),
        &token,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let check = send_json(
        client
            .get(format!("{}/adventurer-availability/{}/check", BASE_URL, adventurer_id))
            .query(&[("startDate", start.to_rfc3339()), ("endDate", end.to_rfc3339())]),
        &token,
        StatusCode::OK,
    )
    .await;
    assert_eq!(check["isAvailable"], false);

    let schedule = send_json(
        client
            .get(format!("{}/adventurer-availability/{}/schedule", BASE_URL, adventurer_id))
            .query(&[
                ("startDate", (start - Duration::days(1)).to_rfc3339()),
                ("endDate", end.to_rfc3339()),
            ]),
        &token,
        StatusCode::OK,
    )
    .await;
    let days = schedule.as_array().expect("schedule days");
    assert_eq!(days[0]["status"], "available");
    assert_eq!(days[1]["status"], "rest");

    send_json(
        client.delete(format!("{}/adventurer-availability/rests/{}", BASE_URL, rest["id"])),
        &token,
        StatusCode::NO_CONTENT,
    )
    .await;
}

#[tokio::test]
#[ignore]
async fn test_quest_lifecycle() {
    let client = Client::new();
    let staff = staff_token(&client).await;
    let giver = client_token(&client).await;

    let adventurer_id = create_adventurer(&client, &staff, 40).await;

    let equipment_type_id = create_named(&client, &staff, "equipment-types").await;
    let equipment = send_json(
        client.post(format!("{}/equipment", BASE_URL)).json(&json!({
            "name": "Longsword",
            "equipmentTypeId": equipment_type_id,
            "maxDurability": 10,
        })),
        &staff,
        StatusCode::CREATED,
    )
    .await;
    let stock = send_json(
        client.post(format!("{}/equipment/{}/stocks", BASE_URL, equipment["id"])),
        &staff,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(stock["durability"], 10);
    assert_eq!(stock["status"], "available");

    let consumable_type_id = create_named(&client, &staff, "consumable-types").await;
    let potion = send_json(
        client.post(format!("{}/consumables", BASE_URL)).json(&json!({
            "name": "Healing potion",
            "consumableTypeId": consumable_type_id,
            "quantity": 5,
        })),
        &staff,
        StatusCode::CREATED,
    )
    .await;

    // Client posts the quest
    let quest = send_json(
        client.post(format!("{}/quests", BASE_URL)).json(&json!({
            "name": "Clear the crypt",
            "description": "Undead in the old crypt",
            "finalDate": Utc::now() + Duration::days(60),
            "reward": 500,
            "estimatedDuration": 2,
        })),
        &giver,
        StatusCode::CREATED,
    )
    .await;
    let quest_id = quest["id"].as_i64().expect("quest id");
    assert_eq!(quest["status"]["name"], "waiting");

    // Clients cannot validate
    send_json(
        client.patch(format!("{}/quests/{}/validate", BASE_URL, quest_id)),
        &giver,
        StatusCode::FORBIDDEN,
    )
    .await;

    send_json(
        client
            .patch(format!("{}/quests/{}/adventurers/attach", BASE_URL, quest_id))
            .json(&json!({ "ids": [adventurer_id] })),
        &staff,
        StatusCode::OK,
    )
    .await;
    send_json(
        client
            .patch(format!("{}/quests/{}/equipment-stocks/set", BASE_URL, quest_id))
            .json(&json!({ "ids": [stock["id"]] })),
        &staff,
        StatusCode::OK,
    )
    .await;

    // More potions than in stock
    send_json(
        client
            .patch(format!("{}/quests/{}/consumables/attach", BASE_URL, quest_id))
            .json(&json!({ "consumables": [{ "consumableId": potion["id"], "quantity": 6 }] })),
        &staff,
        StatusCode::BAD_REQUEST,
    )
    .await;
    let with_potions = send_json(
        client
            .patch(format!("{}/quests/{}/consumables/attach", BASE_URL, quest_id))
            .json(&json!({ "consumables": [{ "consumableId": potion["id"], "quantity": 2 }] })),
        &staff,
        StatusCode::OK,
    )
    .await;
    assert_eq!(with_potions["consumables"][0]["quantity"], 2);

    // Start requires validation first
    send_json(
        client.patch(format!("{}/quests/{}/start", BASE_URL, quest_id)),
        &staff,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let validated = send_json(
        client.patch(format!("{}/quests/{}/validate", BASE_URL, quest_id)),
        &staff,
        StatusCode::OK,
    )
    .await;
    assert_eq!(validated["status"]["name"], "validated");

    let started = send_json(
        client.patch(format!("{}/quests/{}/start", BASE_URL, quest_id)),
        &staff,
        StatusCode::OK,
    )
    .await;
    assert_eq!(started["status"]["name"], "started");
    assert!(started["startDate"].is_string());
    assert_eq!(started["equipmentStocks"][0]["status"], "borrowed");

    // Assignments are frozen once started
    send_json(
        client
            .patch(format!("{}/quests/{}/adventurers/detach", BASE_URL, quest_id))
            .json(&json!({ "ids": [adventurer_id] })),
        &staff,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let check = send_json(
        client
            .get(format!("{}/adventurer-availability/{}/check", BASE_URL, adventurer_id))
            .query(&[
                ("startDate", Utc::now().to_rfc3339()),
                ("endDate", (Utc::now() + Duration::hours(1)).to_rfc3339()),
            ]),
        &staff,
        StatusCode::OK,
    )
    .await;
    assert_eq!(check["isAvailable"], false);

    let finished = send_json(
        client
            .patch(format!("{}/quests/{}/finish", BASE_URL, quest_id))
            .json(&json!({ "isSuccess": true })),
        &staff,
        StatusCode::OK,
    )
    .await;
    assert_eq!(finished["status"]["name"], "succeeded");
    assert_eq!(finished["equipmentStocks"][0]["status"], "available");
    assert_eq!(finished["equipmentStocks"][0]["durability"], 9);

    let potion_after = send_json(
        client.get(format!("{}/consumables/{}", BASE_URL, potion["id"])),
        &staff,
        StatusCode::OK,
    )
    .await;
    assert_eq!(potion_after["quantity"], 3);

    let adventurer = send_json(
        client.get(format!("{}/adventurers/{}", BASE_URL, adventurer_id)),
        &staff,
        StatusCode::OK,
    )
    .await;
    assert_eq!(adventurer["experience"], 110);

    // Terminal state
    send_json(
        client.patch(format!("{}/quests/{}/abandon", BASE_URL, quest_id)),
        &giver,
        StatusCode::BAD_REQUEST,
    )
    .await;
}

/// Create an equipment definition with one available stock row
async fn create_stock(client: &Client, token: &str) -> Value {
    let equipment_type_id = create_named(client, token, "equipment-types").await;
    let equipment = send_json(
        client.post(format!("{}/equipment", BASE_URL)).json(&json!({
            "name": format!("Shield {}", Uuid::new_v4()),
            "equipmentTypeId": equipment_type_id,
            "maxDurability": 5,
        })),
        token,
        StatusCode::CREATED,
    )
    .await;
    send_json(
        client.post(format!("{}/equipment/{}/stocks", BASE_URL, equipment["id"])),
        token,
        StatusCode::CREATED,
    )
    .await
}

async fn create_quest(client: &Client, token: &str, adventurer_ids: &[i64], stock_ids: &[i64]) -> i64 {
    let body = send_json(
        client.post(format!("{}/quests", BASE_URL)).json(&json!({
            "name": format!("Quest {}", Uuid::new_v4()),
            "description": "Escort the caravan",
            "finalDate": Utc::now() + Duration::days(30),
            "reward": 100,
            "estimatedDuration": 3,
            "adventurerIds": adventurer_ids,
            "equipmentStockIds": stock_ids,
        })),
        token,
        StatusCode::CREATED,
    )
    .await;
    body["id"].as_i64().expect("quest id")
}

async fn quest_status(client: &Client, token: &str, quest_id: i64) -> String {
    let quest = send_json(client.get(format!("{}/quests/{}", BASE_URL, quest_id)), token, StatusCode::OK).await;
    quest["status"]["name"].as_str().expect("status name").to_string()
}

fn ids_of(items: &Value) -> Vec<i64> {
    items
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}

#[tokio::test]
#[ignore]
async fn test_set_with_empty_list_clears_stocks() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let stock = create_stock(&client, &token).await;
    let stock_id = stock["id"].as_i64().expect("stock id");
    let quest_id = create_quest(&client, &token, &[], &[stock_id]).await;

    let cleared = send_json(
        client
            .patch(format!("{}/quests/{}/equipment-stocks/set", BASE_URL, quest_id))
            .json(&json!({ "ids": [] })),
        &token,
        StatusCode::OK,
    )
    .await;
    assert!(cleared["equipmentStocks"].as_array().expect("stocks").is_empty());

    let reloaded = send_json(client.get(format!("{}/quests/{}", BASE_URL, quest_id)), &token, StatusCode::OK).await;
    assert!(reloaded["equipmentStocks"].as_array().expect("stocks").is_empty());
}

#[tokio::test]
#[ignore]
async fn test_attach_then_detach_restores_adventurers() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let original = create_adventurer(&client, &token, 10).await;
    let second = create_adventurer(&client, &token, 10).await;
    let third = create_adventurer(&client, &token, 10).await;
    let quest_id = create_quest(&client, &token, &[original], &[]).await;

    let attached = send_json(
        client
            .patch(format!("{}/quests/{}/adventurers/attach", BASE_URL, quest_id))
            .json(&json!({ "ids": [second, third, second] })),
        &token,
        StatusCode::OK,
    )
    .await;
    assert_eq!(ids_of(&attached["adventurers"]), vec![original, second, third]);

    let detached = send_json(
        client
            .patch(format!("{}/quests/{}/adventurers/detach", BASE_URL, quest_id))
            .json(&json!({ "ids": [second, third] })),
        &token,
        StatusCode::OK,
    )
    .await;
    assert_eq!(ids_of(&detached["adventurers"]), vec![original]);
}

#[tokio::test]
#[ignore]
async fn test_finish_from_validated_is_rejected() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let quest_id = create_quest(&client, &token, &[], &[]).await;

    send_json(client.patch(format!("{}/quests/{}/validate", BASE_URL, quest_id)), &token, StatusCode::OK).await;
    send_json(
        client
            .patch(format!("{}/quests/{}/finish", BASE_URL, quest_id))
            .json(&json!({ "isSuccess": true })),
        &token,
        StatusCode::BAD_REQUEST,
    )
    .await;

    assert_eq!(quest_status(&client, &token, quest_id).await, "validated");
}

#[tokio::test]
#[ignore]
async fn test_failed_start_rolls_back_everything() {
    let client = Client::new();
    let token = staff_token(&client).await;

    // Locked in id order: the free adventurer gets a mission rest before the
    // busy one fails the overlap check
    let free = create_adventurer(&client, &token, 10).await;
    let busy = create_adventurer(&client, &token, 10).await;
    send_json(
        client.post(format!("{}/adventurer-availability/rests", BASE_URL)).json(&json!({
            "adventurerId": busy,
            "startDate": Utc::now() - Duration::hours(1),
            "endDate": Utc::now() + Duration::days(10),
            "reason": "Broken leg",
            "type": "unavailable",
        })),
        &token,
        StatusCode::CREATED,
    )
    .await;

    let stock = create_stock(&client, &token).await;
    let stock_id = stock["id"].as_i64().expect("stock id");
    let quest_id = create_quest(&client, &token, &[free, busy], &[stock_id]).await;
    send_json(client.patch(format!("{}/quests/{}/validate", BASE_URL, quest_id)), &token, StatusCode::OK).await;

    send_json(client.patch(format!("{}/quests/{}/start", BASE_URL, quest_id)), &token, StatusCode::BAD_REQUEST).await;

    let quest = send_json(client.get(format!("{}/quests/{}", BASE_URL, quest_id)), &token, StatusCode::OK).await;
    assert_eq!(quest["status"]["name"], "validated");
    assert!(quest["startDate"].is_null());
    assert_eq!(quest["equipmentStocks"][0]["status"], "available");

    let rests = send_json(
        client.get(format!("{}/adventurer-availability/{}/rests", BASE_URL, free)),
        &token,
        StatusCode::OK,
    )
    .await;
    assert!(rests.as_array().expect("rests").is_empty());
}

#[tokio::test]
#[ignore]
async fn test_started_quest_cannot_be_edited() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let quest_id = create_quest(&client, &token, &[], &[]).await;

    send_json(client.patch(format!("{}/quests/{}/validate", BASE_URL, quest_id)), &token, StatusCode::OK).await;
    send_json(client.patch(format!("{}/quests/{}/start", BASE_URL, quest_id)), &token, StatusCode::OK).await;

    send_json(
        client
            .patch(format!("{}/quests/{}", BASE_URL, quest_id))
            .json(&json!({ "reward": 900 })),
        &token,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(quest_status(&client, &token, quest_id).await, "started");

    send_json(
        client
            .patch(format!("{}/quests/{}/finish", BASE_URL, quest_id))
            .json(&json!({ "isSuccess": false })),
        &token,
        StatusCode::OK,
    )
    .await;
}

#[tokio::test]
#[ignore]
async fn test_status_route_respects_roles() {
    let client = Client::new();
    let giver = client_token(&client).await;
    let quest_id = create_quest(&client, &giver, &[], &[]).await;

    send_json(
        client
            .patch(format!("{}/quests/{}/status", BASE_URL, quest_id))
            .json(&json!({ "statusName": "validated" })),
        &giver,
        StatusCode::FORBIDDEN,
    )
    .await;
    assert_eq!(quest_status(&client, &giver, quest_id).await, "waiting");

    let cancelled = send_json(
        client
            .patch(format!("{}/quests/{}/status", BASE_URL, quest_id))
            .json(&json!({ "statusName": "cancelled" })),
        &giver,
        StatusCode::OK,
    )
    .await;
    assert_eq!(cancelled["status"]["name"], "cancelled");
}

#[tokio::test]
#[ignore]
async fn test_oversized_consumable_request_is_rejected() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let consumable_type_id = create_named(&client, &token, "consumable-types").await;
    let potion = send_json(
        client.post(format!("{}/consumables", BASE_URL)).json(&json!({
            "name": "Mana potion",
            "consumableTypeId": consumable_type_id,
            "quantity": 5,
        })),
        &token,
        StatusCode::CREATED,
    )
    .await;
    let quest_id = create_quest(&client, &token, &[], &[]).await;

    send_json(
        client
            .patch(format!("{}/quests/{}/consumables/attach", BASE_URL, quest_id))
            .json(&json!({ "consumables": [
                { "consumableId": potion["id"], "quantity": i32::MAX },
                { "consumableId": potion["id"], "quantity": i32::MAX },
            ] })),
        &token,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let quest = send_json(client.get(format!("{}/quests/{}", BASE_URL, quest_id)), &token, StatusCode::OK).await;
    assert!(quest["consumables"].as_array().expect("consumables").is_empty());
}

#[tokio::test]
#[ignore]
async fn test_malformed_body_gets_error_body() {
    let client = Client::new();
    let token = staff_token(&client).await;

    let response = client
        .post(format!("{}/quests", BASE_URL))
        .bearer_auth(&token)
        .header("Content-Type", "application/json")
        .body(r#"{"name": 5"#)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["path"], "/api/quests");
    assert_eq!(body["statusCode"], 400);
}

#[tokio::test]
#[ignore]
async fn test_parallel_quest_reads() {
    let client = Client::new();
    let token = staff_token(&client).await;
    let adventurer_id = create_adventurer(&client, &token, 10).await;
    let quest_id = create_quest(&client, &token, &[adventurer_id], &[]).await;

    // More requests than the default pool has connections
    let mut handles = Vec::new();
    for _ in 0..30 {
        let client = client.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            client
                .get(format!("{}/quests/{}", BASE_URL, quest_id))
                .bearer_auth(token)
                .send()
                .await
                .expect("Failed to send request")
                .status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.expect("task panicked"), StatusCode::OK);
    }
}
