use std::sync::Arc;

use retrying_http::{ClientOptions, Headers, RequestSpec, RetryPolicy, RetryingRequestExecutor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("RETRYING_HTTP_DEMO_URL")?;
    let opts = ClientOptions::from_env()?;

    let defaults = Arc::new(Headers::from([("accept", "application/json")]));
    let executor = RetryingRequestExecutor::from_options(opts.clone())
        .with_policy(RetryPolicy::from_options(&opts).with_default_headers(defaults));

    let response = executor
        .send(&RequestSpec::get(&url).header("x-request-id", "demo-1"))
        .await?;

    println!("{} {}", response.status(), response.text()?);

    Ok(())
}
