use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use workforce_admin::config::AppConfig;
use workforce_admin::error::AppError;
use workforce_admin::infra::{
    seed_companies, InMemoryCompanyDirectory, InMemoryEmployeeStore, InMemoryIdentityBackend,
};
use workforce_admin::telemetry;
use workforce_admin::workflows::employees::{
    employee_router, Company, EmployeeDraft, EmployeeProvisioningService, ValidationEngine,
};

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Workforce Admin",
    about = "Run the employee provisioning service or exercise its validation rules",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Employee pipeline utilities
    Employees {
        #[command(subcommand)]
        command: EmployeesCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum EmployeesCommand {
    /// Run the local field rules against a draft JSON file
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Path to a JSON employee draft
    draft: PathBuf,
    /// Optional JSON company list for the foreign-key rule (defaults to the
    /// seeded demo directory)
    #[arg(long)]
    companies: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Employees {
            command: EmployeesCommand::Validate(args),
        } => run_validate(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    // Local runs wire the pipeline to in-memory backends; real deployments
    // substitute identity/store clients behind the same traits.
    let store = Arc::new(InMemoryEmployeeStore::default());
    let service = Arc::new(EmployeeProvisioningService::new(
        Arc::new(InMemoryCompanyDirectory::seeded()),
        store.clone(),
        Arc::new(InMemoryIdentityBackend::default()),
        store,
        &config.provisioning,
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(employee_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "employee provisioning service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let ValidateArgs { draft, companies } = args;

    let draft: EmployeeDraft = serde_json::from_str(&std::fs::read_to_string(draft)?)?;
    let companies: Vec<Company> = match companies {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => seed_companies(),
    };

    let verdict = match ValidationEngine::new().check(&draft, &companies) {
        Ok(()) => json!({ "valid": true }),
        Err(errors) => json!({ "valid": false, "errors": errors }),
    };
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
