#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod run;

use anyhow::Context;
use args::Args;
use axon_config::Config;
use axon_core::RequestContext;
use axon_openai::OpenAiProvider;
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize telemetry
    axon_telemetry::init(&config.telemetry)?;

    let (key, provider_config) = match args.provider.as_deref() {
        Some(key) => config
            .providers
            .get_key_value(key)
            .with_context(|| format!("provider '{key}' is not configured"))?,
        None => config.providers.first().context("no providers configured")?,
    };

    tracing::debug!(
        config_path = %args.config.display(),
        provider = %key,
        "starting axon"
    );

    let provider = OpenAiProvider::new(key.clone(), provider_config.clone())?;

    // Ctrl+C cancels the in-flight request
    let shutdown = CancellationToken::new();
    let mut ctx = RequestContext::new().with_cancellation(shutdown.clone());
    if let Some(api_key) = args.api_key {
        ctx = ctx.with_api_key(api_key);
    }

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    run::run(&provider, &ctx, args.command).await
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received, cancelling request");
}
