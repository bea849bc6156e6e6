use std::{
    error::Error as _,
    future::{Future, IntoFuture},
    io,
    path::Path,
    pin::Pin,
    process,
    sync::Arc,
    time::Duration,
};

use quire::{
    application::{
        content::ContentLibrary,
        error::AppError,
        render::render_service,
        site::{SitePages, export_site},
    },
    config,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let mut chain = Vec::new();
    let mut current = error.source();
    while let Some(inner) = current {
        chain.push(inner.to_string());
        current = inner.source();
    }

    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?chain, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = ?chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let pages = load_pages(&settings).await?;

    match command {
        config::Command::Serve(_) => run_serve(&settings, pages).await,
        config::Command::Export(args) => run_export(pages, &args.output).await,
    }
}

async fn load_pages(settings: &config::Settings) -> Result<Arc<SitePages>, AppError> {
    let renderer = render_service();
    let library = ContentLibrary::load(
        &settings.content.directory,
        &settings.content.default_language,
        renderer.as_ref(),
    )
    .await?;

    Ok(Arc::new(SitePages::new(
        settings.site.clone(),
        Arc::new(library),
    )))
}

async fn run_export(pages: Arc<SitePages>, output: &Path) -> Result<(), AppError> {
    let summary = export_site(&pages, output).await?;
    info!(
        target = "quire::export",
        pages = summary.pages,
        assets = summary.assets,
        "Static site written"
    );
    Ok(())
}

async fn run_serve(settings: &config::Settings, pages: Arc<SitePages>) -> Result<(), AppError> {
    let router = http::build_router(HttpState { pages });

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "quire::http",
        addr = %settings.server.addr,
        "Listening"
    );

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.map_err(server_error),
        _ = shutdown_signal() => {
            info!(target = "quire::http", "Shutdown signal received, draining connections");
        }
    }

    drain(server.as_mut(), settings.server.graceful_shutdown)
        .await
        .map_err(server_error)
}

fn server_error(err: io::Error) -> AppError {
    AppError::from(InfraError::server(err.to_string()))
}

async fn drain<F>(server: Pin<&mut F>, grace: Duration) -> io::Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    match tokio::time::timeout(grace, server).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                target = "quire::http",
                grace_seconds = grace.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "quire::http", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target = "quire::http", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
