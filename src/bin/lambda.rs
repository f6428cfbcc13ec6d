//! AWS Lambda entry point for the CDX exporter
//!
//! Deploy with `cargo lambda build --release --features lambda`.
//! The event is an export request; the response carries the records and
//! all three export payloads, or `{ "error": ... }`.

use cdx_export::{
    error::AppError,
    models::{ArchiveRequest, Config, ContentKind, ExportBundle, FieldOption},
    pipeline,
};
use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Export request as delivered in the Lambda event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportEvent {
    #[serde(flatten)]
    request: ArchiveRequest,
    #[serde(default)]
    kind: Option<ContentKind>,
    #[serde(default)]
    fields: Option<Vec<FieldOption>>,
}

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("CDX exporter Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}

/// Handler for AWS Lambda events.
#[instrument(skip(event), fields(request_id = %event.context.request_id))]
async fn handler(event: LambdaEvent<Value>) -> Result<Value, LambdaError> {
    let config_path =
        std::env::var("CDX_EXPORT_CONFIG").unwrap_or_else(|_| "cdx-export.toml".to_string());
    let config = Config::load_or_default(&config_path);

    match run(&config, event.payload).await {
        Ok(bundle) => {
            info!(
                total = bundle.total,
                username = %bundle.username,
                "Export complete"
            );
            Ok(render_bundle(&bundle))
        }
        Err(e) => {
            error!("Export failed: {}", e);
            Ok(json!({ "error": e.to_string() }))
        }
    }
}

async fn run(config: &Config, payload: Value) -> Result<ExportBundle, AppError> {
    let event: ExportEvent =
        serde_json::from_value(payload).map_err(|e| AppError::input(e.to_string()))?;
    let kind = event.kind.unwrap_or_default();
    let fields = event
        .fields
        .unwrap_or_else(|| kind.field_options().to_vec());

    pipeline::run_export(config, &event.request, &fields, kind).await
}

fn render_bundle(bundle: &ExportBundle) -> Value {
    let field_options: Vec<&str> = bundle
        .records
        .first()
        .map(|r| r.keys().map(FieldOption::as_str).collect())
        .unwrap_or_default();

    json!({
        "data": bundle.records,
        "meta": {
            "total": bundle.total,
            "username": bundle.username,
            "filename": bundle.filename,
            "showResumeKey": bundle.show_resume_key,
            "resumptionKey": bundle.resumption_key,
            "fieldOptions": field_options,
        },
        "exports": {
            "csv": bundle.csv,
            "json": bundle.json,
            "html": bundle.html,
        },
    })
}
