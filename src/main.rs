use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use granulearn::api::ApiDoc;
use granulearn::api::courses::get_courses_scope;
use granulearn::config::Config;
use granulearn::service::CourseService;
use granulearn::store::CourseStore;
use granulearn::utils::init_log;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Path to the course base directory scanned at startup
    #[arg(short = 'b', long)]
    coursebase: Option<PathBuf>,

    /// Host to bind
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Language stamped into the metadata of imported courses
    #[arg(short, long)]
    language: Option<String>,

    /// Directory for daily rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(database) = args.database {
        config.database = database;
    }
    if let Some(coursebase) = args.coursebase {
        config.coursebase = coursebase;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(language) = args.language {
        config.language = language;
    }
    if let Some(log_dir) = args.log_dir {
        config.log_dir = Some(log_dir);
    }

    let _guard = init_log(config.log_dir.clone());

    println!("Starting server at http://{}:{}", config.host, config.port);
    println!(
        "Swagger UI available at http://{}:{}/swagger-ui",
        config.host, config.port
    );

    let store = CourseStore::open(&config.database).await?;
    let service = Arc::new(CourseService::new(store, &config.language));

    let imported = service.import_course_base(&config.coursebase).await?;
    info!(
        "imported {imported} courses from {}",
        config.coursebase.display()
    );

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", get_courses_scope())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
