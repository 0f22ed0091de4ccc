use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use reqwest::header::CONTENT_TYPE;

/// Posts line protocol to a relay the way a sensor device does.
#[derive(Parser)]
#[command(name = "relay-send")]
#[command(about = "Send line protocol to an influx-relay ingest endpoint", long_about = None)]
struct Cli {
    /// Relay ingest URL.
    #[arg(short, long, default_value = "http://localhost:8080/write-data")]
    url: String,

    /// File with line protocol; reads stdin when omitted.
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let payload = match &cli.file {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let res = reqwest::Client::new()
        .post(&cli.url)
        .header(CONTENT_TYPE, "text/plain")
        .body(payload)
        .send()
        .await?;

    let status = res.status();
    let text = res.text().await.unwrap_or_default();

    if status.is_success() {
        println!("{}: {}", status.as_u16(), text);
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Error: relay returned status {}", status);
        eprintln!("Response: {}", text);
        Ok(ExitCode::FAILURE)
    }
}
