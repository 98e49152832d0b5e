use api_fetch::{ApiClient, ClientOptions, RetryPolicy, StatusPayload, Validator};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url = std::env::var("API_URL")?;

    let client = ApiClient::new().with_options(ClientOptions {
        base_url: Some(base_url.parse()?),
        timeout_ms: Some(5_000),
        retry: RetryPolicy {
            retries: 2,
            retry_delay_ms: 250,
        },
        ..ClientOptions::default()
    });

    let health = client.get_status("health").await?;
    println!("health: {}", health.status);

    let created: StatusPayload = client
        .post(
            "users",
            &json!({ "name": "Kit" }),
            client.request().validate_with(Validator::json()),
        )
        .await?;
    println!("{created:?}");

    Ok(())
}
