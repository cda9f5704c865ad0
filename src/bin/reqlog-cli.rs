//! Client CLI for the sample API.
//!
//! Every call carries an `x-correlation-id` and a freshly rendered
//! `traceparent` header, so server-side records can be joined to the
//! invocation that caused them.

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use uuid::Uuid;

use reqlog::trace::{TraceContext, CORRELATION_ID_HEADER, TRACE_CONTEXT_HEADER};

#[derive(Parser)]
#[command(name = "reqlog-cli")]
#[command(about = "Client CLI for the reqlog sample service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all samples
    List,
    /// Fetch one sample by id
    Get { id: u64 },
    /// Create a new sample
    Create { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let correlation_id = Uuid::new_v4().to_string();
    let trace_context = TraceContext::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        CORRELATION_ID_HEADER,
        HeaderValue::from_str(&correlation_id)?,
    );
    headers.insert(
        TRACE_CONTEXT_HEADER,
        HeaderValue::from_str(trace_context.render())?,
    );

    eprintln!("correlation id: {correlation_id}");
    eprintln!("traceparent:    {}", trace_context.render());

    match cli.command {
        Commands::List => {
            let res = client
                .get(format!("{}/api/samples", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Get { id } => {
            let res = client
                .get(format!("{}/api/samples/{}", cli.url, id))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Create { name } => {
            let res = client
                .post(format!("{}/api/samples", cli.url))
                .headers(headers)
                .json(&json!({ "name": name, "created_by": Uuid::new_v4() }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
