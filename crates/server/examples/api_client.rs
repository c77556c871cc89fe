//! Walks through the Rolodex Server API against a running instance

use reqwest::Client;
use serde_json::{json, Value};

const SERVER_URL: &str = "http://localhost:9090";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    // Example 1: Fetch a token
    println!("1. Issue Token:");
    let resp = client.get(format!("{SERVER_URL}/token")).send().await?;
    println!("Status: {}", resp.status());
    let body: Value = resp.json().await?;
    let token = body["token"].as_str().unwrap_or_default().to_string();
    println!("Token: {token}");
    println!();

    let bearer = format!("Bearer {token}");

    // Example 2: Create a record
    println!("2. Create Record:");
    let resp = client
        .post(format!("{SERVER_URL}/data"))
        .header("Authorization", &bearer)
        .json(&json!({ "name": "Ana", "email": "ana@example.com" }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 3: List records
    println!("3. List Records:");
    let resp = client.get(format!("{SERVER_URL}/data1")).send().await?;
    println!("Status: {}", resp.status());
    let body: Value = resp.json().await?;
    println!("Body: {body}");
    println!();

    let Some(id) = body["message"]
        .as_array()
        .and_then(|records| records.last())
        .and_then(|record| record["id"].as_str())
        .map(str::to_string)
    else {
        println!("No records listed, stopping here.");
        return Ok(());
    };

    // Example 4: Update the record
    println!("4. Update Record {id}:");
    let resp = client
        .put(format!("{SERVER_URL}/data"))
        .header("Authorization", &bearer)
        .json(&json!({ "id": id, "name": "Ana Maria", "email": "am@example.com" }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 5: Delete the record
    println!("5. Delete Record {id}:");
    let resp = client
        .delete(format!("{SERVER_URL}/data"))
        .header("Authorization", &bearer)
        .query(&[("id", id.as_str())])
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 6: Guarded route without a token
    println!("6. Create Without Token:");
    let resp = client
        .post(format!("{SERVER_URL}/data"))
        .json(&json!({ "name": "Eve", "email": "eve@example.com" }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);

    Ok(())
}
