//! `briefcast` -- submit content briefs and follow them to a result.
//!
//! With `field=value` arguments, submits one brief, prints status
//! updates and the rendered result, and exits. Without arguments, reads
//! commands from stdin (type `help`).
//!
//! ```text
//! briefcast topic=shoes tonality=fun target_audience=teens platforms=tiktok platforms=reels
//! ```
//!
//! # Environment variables
//!
//! | Variable                          | Default                 | Description                          |
//! |-----------------------------------|-------------------------|--------------------------------------|
//! | `BRIEFCAST_API_URL`               | `http://localhost:8000` | Base URL of the job service          |
//! | `BRIEFCAST_REQUEST_TIMEOUT_SECS`  | `30`                    | Per-request HTTP timeout             |
//! | `BRIEFCAST_POLL_INITIAL_DELAY_MS` | `2000`                  | Delay before the first status check  |
//! | `BRIEFCAST_POLL_INTERVAL_MS`      | `5000`                  | Interval between status checks       |
//! | `BRIEFCAST_ERROR_NOTICE_SECS`     | `5`                     | Lifetime of error notices            |
//! | `BRIEFCAST_INFO_NOTICE_SECS`      | `3`                     | Lifetime of info notices             |
//! | `RUST_LOG`                        | see below               | Log filter                           |
//!
//! Logs go to stderr; the default filter is
//! `briefcast_cli=info,briefcast_tracker=info,briefcast_client=info`.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use briefcast_cli::app;
use briefcast_cli::clipboard::Osc52Clipboard;
use briefcast_cli::config::{AppConfig, DEFAULT_LOG_FILTER};
use briefcast_client::{BriefApi, BriefApiClient};
use briefcast_core::RawForm;
use briefcast_tracker::JobTracker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let form = if args.is_empty() {
        None
    } else {
        Some(RawForm::from_pairs(&args).context("Invalid brief arguments")?)
    };

    let config = AppConfig::from_env();
    tracing::info!(
        api_url = %config.client.api_url,
        timeout_secs = config.client.request_timeout.as_secs(),
        "Starting briefcast",
    );

    let client = BriefApiClient::new(&config.client).context("Failed to build HTTP client")?;

    match client.health().await {
        Ok(health) => tracing::info!(status = %health.status, "Job service reachable"),
        Err(e) => tracing::warn!(error = %e, "Job service health check failed"),
    }

    let (handle, task) = JobTracker::spawn(
        Arc::new(client),
        config.tracker,
        Arc::new(Osc52Clipboard::stdout()),
    );

    let code = match form {
        Some(form) => app::run_once(&handle, form).await?,
        None => {
            app::run_interactive(&handle).await?;
            ExitCode::SUCCESS
        }
    };

    handle.shutdown().ok();
    task.await.ok();
    Ok(code)
}
