use crate::config::Config;
use crate::services::{
    CatalogSearch, CoverArtPolicy, Id3Tagger, SpotifyCatalogSearch, SpotifyMetadataProvider,
    YouTubeSourceResolver, YtDlpFetcher,
};
use actix_rt::signal::unix;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use catalog_providers::{SpotifyClient, YouTubeClient};
use download_pipeline::{
    CancellationToken, DownloadPipeline, DownloadQueue, DownloadWorkerPool, Expander,
    SelectionStore,
};
use futures_lite::FutureExt;
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod http;
mod services;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn startup_error(error: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::new(ErrorKind::Other, error)
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let mut terminate = unix::signal(unix::SignalKind::terminate())?;
    let mut interrupt = unix::signal(unix::SignalKind::interrupt())?;

    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|error| {
        error!(%error, "Invalid configuration");
        startup_error(error)
    })?;

    info!(version = VERSION, "Starting application...");

    let spotify_client = Arc::new(
        SpotifyClient::create(&config.spotify.endpoint, &config.spotify.access_token)
            .map_err(startup_error)?,
    );
    let youtube_client = Arc::new(
        YouTubeClient::create(&config.youtube.endpoint, &config.youtube.api_key)
            .map_err(startup_error)?,
    );
    let tagger = Id3Tagger::create(CoverArtPolicy::from_required_flag(
        config.cover_art_required,
    ))
    .map_err(startup_error)?;

    let download_pipeline = DownloadPipeline::new(
        Arc::new(YouTubeSourceResolver(youtube_client)),
        Arc::new(YtDlpFetcher::new(&config.ytdlp_path)),
        Arc::new(tagger),
        &config.music_home,
    );

    let worker_pool = Arc::new(DownloadWorkerPool::start(
        config.worker_pool_size(),
        config.queue_capacity,
        Arc::new(download_pipeline),
    ));

    let selection_store = Arc::new(SelectionStore::new(config.selection_ttl()));
    let sweeper = selection_store.spawn_sweeper(config.selection_sweep_interval());

    let expander = Arc::new(Expander::new(
        Arc::new(SpotifyMetadataProvider(Arc::clone(&spotify_client))),
        Arc::clone(&worker_pool) as Arc<dyn DownloadQueue>,
    ));
    let catalog_search: Arc<dyn CatalogSearch> = Arc::new(SpotifyCatalogSearch(spotify_client));

    let shutdown = CancellationToken::new();

    let shutdown_timeout = config.shutdown_timeout;
    let bind_address = config.bind_address.clone();

    let server = HttpServer::new({
        let selection_store = Arc::clone(&selection_store);
        let shutdown = shutdown.clone();

        move || {
            App::new()
                .app_data(Data::new(Arc::clone(&catalog_search)))
                .app_data(Data::new(Arc::clone(&selection_store)))
                .app_data(Data::new(Arc::clone(&expander)))
                .app_data(Data::new(shutdown.clone()))
                .service(web::resource("/").route(web::get().to(http::health_check)))
                .service(web::resource("/search").route(web::get().to(http::search)))
                .service(web::resource("/download").route(web::post().to(http::download)))
        }
    })
    .shutdown_timeout(shutdown_timeout)
    .bind(bind_address)?
    .run();

    let server_handle = server.handle();

    actix_rt::spawn({
        async move {
            if let Err(error) = server.await {
                error!(?error, "Error on http server");
            }
        }
    });

    info!("Application started");

    interrupt.recv().or(terminate.recv()).await;

    info!("Received shutdown signal. Shutting down gracefully...");

    server_handle.stop(true).await;

    shutdown.cancel();

    if let Err(error) = worker_pool.shutdown().await {
        error!(%error, "Unable to shut down download worker pool");
    }

    sweeper.shutdown().await;

    info!("Application stopped");

    Ok(())
}
