//! Command-line front end for `gateway-probe`.
//!
//! Output is meant for a human at a terminal: status lines are colored,
//! parsed payloads are pretty-printed JSON.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use crossterm::style::{style, Stylize};
use tracing_subscriber::EnvFilter;

use crate::builders::{ClientBuilder, MessagesRequestBuilder};
use crate::client::{Frame, GatewayClient};
use crate::config::GatewayConfig;
use crate::error::ProbeError;
use crate::sse::{decode_reader, DecodedEvent};
use crate::utils::constants::{
    API_KEY_ENV, DEFAULT_GATEWAY_URL, DEFAULT_RAW_MODEL, DEFAULT_SDK_MODEL, GATEWAY_URL_ENV,
};

#[derive(Debug, Parser)]
#[command(name = "gateway-probe", version, about = "Inspect an LLM gateway's responses")]
pub struct Cli {
    /// Gateway base URL
    #[arg(long, global = true, env = GATEWAY_URL_ENV, default_value = DEFAULT_GATEWAY_URL)]
    pub url: String,

    /// API key sent as `x-api-key`
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Connect timeout in seconds (no total timeout is applied)
    #[arg(long, global = true)]
    pub connect_timeout: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Stream one request and print every raw SSE line and its decoded payload
    Raw(RawArgs),
    /// Send one plain and one streaming Messages request
    Sdk(SdkArgs),
    /// Decode a captured SSE transcript offline
    Decode(DecodeArgs),
}

#[derive(Debug, Args)]
pub struct RawArgs {
    #[arg(long, default_value = DEFAULT_RAW_MODEL)]
    pub model: String,

    #[arg(long, default_value_t = 100)]
    pub max_tokens: u32,

    #[arg(long, default_value = "Hello! Give me a short response.")]
    pub prompt: String,
}

#[derive(Debug, Args)]
pub struct SdkArgs {
    #[arg(long, default_value = DEFAULT_SDK_MODEL)]
    pub model: String,

    #[arg(long, default_value = "Hello, Claude!")]
    pub prompt: String,

    #[arg(long, default_value = "Hello, Claude! Name 10 largest countries")]
    pub stream_prompt: String,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Transcript file; reads stdin when omitted
    pub file: Option<PathBuf>,
}

pub fn print_err(message: &str) {
    eprintln!("{}", style(message).red());
}

pub fn print_ok(message: &str) {
    println!("{}", style(message).green());
}

pub fn print_info(message: &str) {
    println!("{}", style(message).blue());
}

/// Run the parsed command line.
pub async fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Decode(args) => run_decode(args),
        Commands::Raw(args) => match gateway_config(&cli) {
            Ok(config) => run_raw(config, args).await,
            Err(e) => return fatal(&e),
        },
        Commands::Sdk(args) => match gateway_config(&cli) {
            Ok(config) => run_sdk(config, args).await,
            Err(e) => return fatal(&e),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = report_error(&mut io::stderr(), &e);
            ExitCode::FAILURE
        }
    }
}

/// Write a failed command's error. HTTP errors print the status line, then the
/// raw body on its own line.
fn report_error(out: &mut impl Write, err: &anyhow::Error) -> io::Result<()> {
    match err.downcast_ref::<ProbeError>() {
        Some(ProbeError::Http { status, body }) => {
            writeln!(out, "{}", style(format!("Error: Status code {status}")).red())?;
            writeln!(out, "{body}")
        }
        _ => writeln!(out, "{}", style(format!("Error: {err:#}")).red()),
    }
}

fn fatal(err: &ProbeError) -> ExitCode {
    print_err(&format!("Error: {err}"));
    ExitCode::FAILURE
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "gateway_probe=debug",
        _ => "gateway_probe=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Resolve the gateway configuration from flags and environment.
pub fn gateway_config(cli: &Cli) -> Result<GatewayConfig, ProbeError> {
    let mut builder = ClientBuilder::new(&cli.url);
    if let Some(key) = &cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(secs) = cli.connect_timeout {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }
    builder.into_config()
}

async fn run_raw(config: GatewayConfig, args: &RawArgs) -> anyhow::Result<()> {
    let client = GatewayClient::new(config)?;
    let request = MessagesRequestBuilder::new(&args.model)
        .max_tokens(args.max_tokens)
        .user(&args.prompt)
        .stream(true)
        .build();

    println!("Making streaming request...");
    let mut stream = client.stream_message(request).await?;

    let headers: std::collections::BTreeMap<_, _> = stream
        .headers()
        .iter()
        .map(|(name, value)| (name.as_str(), value.to_str().unwrap_or("<binary>")))
        .collect();
    println!("Response headers: {headers:?}");

    let mut stdout = io::stdout();
    while let Some(frame) = stream.next_frame().await {
        print_frame(&mut stdout, &frame?)?;
    }
    Ok(())
}

fn print_frame(out: &mut impl Write, frame: &Frame) -> anyhow::Result<()> {
    writeln!(out, "Raw line: {}", frame.line)?;
    if let Some(event) = &frame.event {
        print_event(out, event)?;
    }
    Ok(())
}

fn print_event(out: &mut impl Write, event: &DecodedEvent) -> anyhow::Result<()> {
    match event {
        DecodedEvent::Done => writeln!(out, "Stream completed")?,
        DecodedEvent::Data(value) => {
            writeln!(out, "Parsed JSON: {}", serde_json::to_string_pretty(value)?)?
        }
        DecodedEvent::Malformed { error, .. } => writeln!(out, "JSON parse error: {error}")?,
    }
    Ok(())
}

async fn run_sdk(config: GatewayConfig, args: &SdkArgs) -> anyhow::Result<()> {
    let client = GatewayClient::new(config)?;

    print_info("Sending a test request...");
    let request = MessagesRequestBuilder::new(&args.model)
        .max_tokens(1024)
        .user(&args.prompt)
        .build();
    let message = client.create_message(request).await?;
    match message.first_text() {
        Some(text) => print_ok(&format!("Response: {text}")),
        None => print_err("Response contained no text content"),
    }

    print_info("Sending a streaming test request...");
    let request = MessagesRequestBuilder::new(&args.model)
        .max_tokens(1000)
        .user(&args.stream_prompt)
        .build();
    let mut stream = client.text_stream(request).await?;

    print_info("Streaming response:");
    let mut stdout = io::stdout();
    while let Some(text) = stream.next().await {
        write!(stdout, "{}", text?)?;
        stdout.flush()?;
    }
    println!();
    print_ok("Streaming finished");

    print_ok("Test completed.");
    Ok(())
}

fn run_decode(args: &DecodeArgs) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead> = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let count = decode_transcript(reader, &mut io::stdout())?;
    print_info(&format!("{count} event(s) decoded"));
    Ok(())
}

/// Print every event of a captured transcript and return how many there were.
fn decode_transcript(reader: impl BufRead, out: &mut impl Write) -> anyhow::Result<usize> {
    let mut count = 0usize;
    for event in decode_reader(reader) {
        print_event(out, &event?)?;
        count += 1;
    }
    Ok(count)
}
