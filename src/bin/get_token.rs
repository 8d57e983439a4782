//! Walks through Google's consent flow once and prints the tokens the server
//! reads from its environment.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use gcal_tasks_mcp_server::google::token::TOKEN_URL;
use serde_json::Value;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use url::Url;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const SCOPES: &str = "https://www.googleapis.com/auth/calendar https://www.googleapis.com/auth/tasks";

fn env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Missing environment variable: {key}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let client_id = env("GOOGLE_CLIENT_ID")?;
    let client_secret = env("GOOGLE_CLIENT_SECRET")?;

    let auth_url = Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", client_id.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", SCOPES),
        ],
    )?;
    println!("Authorize this app by visiting this URL:\n\n{auth_url}\n");

    let mut stdout = io::stdout();
    stdout.write_all(b"Paste the authorization code here: ").await?;
    stdout.flush().await?;

    let mut code = String::new();
    BufReader::new(io::stdin()).read_line(&mut code).await?;
    let code = code.trim();
    if code.is_empty() {
        bail!("No authorization code entered");
    }

    let response = reqwest::Client::new()
        .post(TOKEN_URL)
        .form(&[
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("code", code),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .context("Failed to reach the token endpoint")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await?;
        bail!("Failed to get tokens ({status}): {body}");
    }

    let mut tokens: Value = response.json().await?;
    let expires_in = tokens
        .get("expires_in")
        .and_then(Value::as_i64)
        .unwrap_or(3600);
    let expiry_date = (Utc::now() + Duration::seconds(expires_in)).timestamp_millis();

    let Some(object) = tokens.as_object_mut() else {
        bail!("Token response is not a JSON object");
    };
    object.insert("expiry_date".to_owned(), expiry_date.into());

    println!("\nTokens:\n{}", serde_json::to_string_pretty(&tokens)?);

    println!("\nAdd these to your environment or .env file:\n");
    for (var, field) in [
        ("GOOGLE_ACCESS_TOKEN", "access_token"),
        ("GOOGLE_REFRESH_TOKEN", "refresh_token"),
    ] {
        if let Some(value) = tokens.get(field).and_then(Value::as_str) {
            println!("{var}={value}");
        }
    }
    println!("GOOGLE_EXPIRY_DATE={expiry_date}");

    Ok(())
}
