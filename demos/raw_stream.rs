//! Raw Stream — print every decoded SSE event from one streaming request.
//!
//! Start a gateway on `localhost:8080` (or point `GATEWAY_URL` elsewhere),
//! export `REQUESTY_API_KEY`, then:
//! ```sh
//! cargo run --example raw_stream
//! ```

use gateway_probe::client::GatewayClient;
use gateway_probe::config::GatewayConfig;
use gateway_probe::sse::DecodedEvent;
use gateway_probe::MessagesRequestBuilder;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = GatewayClient::new(GatewayConfig::from_env()?)?;

    let request = MessagesRequestBuilder::new("gpt-4o-mini")
        .max_tokens(100)
        .user("Hello! Give me a short response.")
        .build();

    let mut stream = client.stream_message(request).await?;
    println!("--- Stream started ({}) ---", stream.status());

    while let Some(event) = stream.next().await {
        match event? {
            DecodedEvent::Data(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            DecodedEvent::Malformed { error, payload } => {
                println!("[malformed] {error}: {payload}")
            }
            DecodedEvent::Done => println!("[done]"),
        }
    }

    println!("--- Stream ended ---");
    Ok(())
}
