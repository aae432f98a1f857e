//! CLI entry point for the Argus recording downloader.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::Parser;
use tracing::{debug, info};

use argus_core::report::CURL_LOG_FILE;
use argus_core::{
    ArgusClient, Config, DownloadScheduler, FailureReporter, FsSink, RecordingDownloader,
    RetryPolicy, catalog, pager, sink, split_date_range,
};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Argus recording download starting");
    let started = Instant::now();

    let config = Config::from_env()?;

    tokio::fs::create_dir_all(&args.output).await?;
    sink::reset_run_logs(&args.output).await;

    let client = Arc::new(ArgusClient::new(&config.base_url, &config.api_token));
    let reporter = Arc::new(FailureReporter::new(
        args.output.join(CURL_LOG_FILE),
        client.base_url(),
        client.token(),
    ));
    let policy = RetryPolicy::with_max_attempts(u32::from(args.max_retries));
    let downloader = Arc::new(RecordingDownloader::new(
        Arc::clone(&client),
        policy,
        reporter,
    ));
    let scheduler = DownloadScheduler::new(
        downloader,
        usize::from(args.concurrency),
        Duration::from_millis(args.delay_ms),
    )?;

    // A failed catalog fetch degrades to an empty list, which is terminal
    // for the run.
    let catalog = catalog::fetch_all_campaigns(&client).await;
    if catalog.is_empty() {
        bail!("no campaigns available; check the API token and connectivity");
    }

    let campaigns = match args.campaign.or(config.campaign_id) {
        Some(id) => {
            let Some(campaign) = catalog.into_iter().find(|c| c.id == id) else {
                bail!("campaign {id} not found in the catalog");
            };
            info!(campaign_id = id, "restricting run to one campaign");
            vec![campaign]
        }
        None => catalog,
    };

    let chunks = split_date_range(args.from, args.to, args.chunk_days)?;
    info!(
        campaigns = campaigns.len(),
        chunks = chunks.len(),
        chunk_days = args.chunk_days,
        "run plan ready"
    );

    for campaign in &campaigns {
        info!(campaign_id = campaign.id, name = %campaign.name, "processing campaign");
        let campaign_sink = Arc::new(FsSink::create(&args.output, campaign).await?);

        let mut calls = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            debug!(part = index + 1, parts = chunks.len(), "fetching call records for chunk");
            calls.extend(pager::fetch_all_calls(&client, campaign.id, chunk).await);
        }

        if calls.is_empty() {
            info!(campaign_id = campaign.id, "no calls in the period, skipping campaign");
            continue;
        }

        let stats = scheduler.run(campaign.id, calls, campaign_sink).await;
        info!(
            campaign_id = campaign.id,
            success = stats.success(),
            not_found = stats.not_found(),
            failed = stats.failed(),
            existing = stats.existing(),
            total = stats.total(),
            "campaign complete"
        );
    }

    info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        "all campaigns complete"
    );
    Ok(())
}
