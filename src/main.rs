use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use resume_client::{ClientConfig, GeneratedResume, ResumeService};

#[derive(Parser)]
#[command(name = "resume-client")]
#[command(author, version, about = "Generate a resume from a short description", long_about = None)]
struct Cli {
    /// Description of the candidate sent to the backend.
    description: String,

    /// Backend root URL. Defaults to RESUME_API_BASE_URL.
    #[arg(long)]
    base_address: Option<String>,

    /// Require the `{"resume": ...}` response shape instead of printing any body.
    #[arg(long)]
    typed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match cli.base_address {
        Some(base_address) => ClientConfig::new(base_address),
        None => ClientConfig::from_env(),
    };

    let service = ResumeService::from_config(&config);
    info!(base_address = %service.client().base_address(), "requesting resume");

    if cli.typed {
        let generated: GeneratedResume = service
            .generate_resume_as(&cli.description)
            .await
            .context("resume generation failed")?;
        println!("{}", generated.resume);
    } else {
        let body = service
            .generate_resume(&cli.description)
            .await
            .context("resume generation failed")?;
        println!(
            "{}",
            sonic_rs::to_string_pretty(&body).context("failed to format response body")?
        );
    }

    Ok(())
}
