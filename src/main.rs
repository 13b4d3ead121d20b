use std::{str::FromStr, sync::Arc};

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::Resource;
use sheet_sync::{
    adapters::{
        config::{app_config::AppConfig, telemetry_config::TelemetryConfig},
        http::listener::{self, ListenerState},
    },
    prettyprint::prettyprint::PrettyFormatter,
};
use tokio::signal;
use tracing::{error, info, instrument};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

mod synchronizer_factory;

use synchronizer_factory::SynchronizerFactory;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(report) => {
            eprintln!("[CONFIG ERROR] {report:?}");
            return Err("invalid configuration".into());
        }
    };

    setup_tracing(&config.telemetry)?;
    setup_panic_hook();

    info!("Starting sheet-sync");

    let synchronizer = SynchronizerFactory::create(&config.sheets)
        .await
        .map_err(|report| {
            error!("Unable to initialise Google Sheets service: {:?}", report);
            format!("{report}")
        })?;

    let state = ListenerState::new(
        synchronizer,
        config.server.ack_mode,
        config.server.on_sync_error,
    );

    let shutdown_signal = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, stopping update listener...");
    };

    let result = listener::serve(&config.server, state, shutdown_signal).await;
    opentelemetry::global::shutdown_tracer_provider();

    match result {
        Ok(_) => {
            info!("Graceful shutdown completed");
            Ok(())
        }
        Err(report) => {
            error!("Update listener error: {:?}", report);
            Err(format!("{report}").into())
        }
    }
}

fn setup_tracing(config: &TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let level = LevelFilter::from_str(&config.level)?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(std::io::stdout);

    let log_file_layer = match &config.log_file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .event_format(PrettyFormatter::new(false))
                .with_writer(Arc::new(std::fs::File::create(path)?))
                .with_ansi(false),
        ),
        None => None,
    };

    let otel_layer = match &config.otlp_endpoint {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint.clone());

            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "sheet_sync"),
                ])))
                .install_batch(opentelemetry_sdk::runtime::Tokio)?;

            Some(OpenTelemetryLayer::new(tracer))
        }
        None => None,
    };

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("sheet_sync", level)
                .with_target("tower_http", level),
        )
        .with(otel_layer)
        .with(log_file_layer)
        .with(stdout_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
        opentelemetry::global::shutdown_tracer_provider();
    }));
}
