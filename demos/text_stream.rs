//! Text Stream — print only the generated text, as it arrives.
//!
//! ```sh
//! REQUESTY_API_KEY=... cargo run --example text_stream
//! ```

use std::io::Write;

use gateway_probe::client::GatewayClient;
use gateway_probe::config::GatewayConfig;
use gateway_probe::MessagesRequestBuilder;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = GatewayClient::new(GatewayConfig::from_env()?)?;

    let request = MessagesRequestBuilder::new("openai/gpt-4o-mini")
        .max_tokens(1000)
        .user("Name the 10 largest countries.")
        .build();

    let mut stream = client.text_stream(request).await?;
    let mut stdout = std::io::stdout();
    while let Some(text) = stream.next().await {
        write!(stdout, "{}", text?)?;
        stdout.flush()?;
    }
    println!();

    Ok(())
}
