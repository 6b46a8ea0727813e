use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use futures_util::stream::Stream;
use log::{debug, error, info, warn};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::{
    ServeArgs,
    build::{BuildResult, Builder, FileWatcher, PathClassifier, WatchEvent},
    commands::absolute,
    config::{Config, site_root_from_config},
    logging::format_elapsed,
};

/// SSE handler for live reload notifications.
async fn live_reload_handler(
    State(tx): State<broadcast::Sender<()>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = tx.subscribe();
    let stream = async_stream::stream! {
        let mut rx = rx;
        loop {
            match rx.recv().await {
                Ok(_) => {
                    yield Ok(Event::default().event("reload").data("reload"));
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn run(args: &ServeArgs) -> Result<(), anyhow::Error> {
    let config_path = Config::path_from_arg(args.config_file.as_deref())?;
    let config = Config::load_from_file(&config_path)?;

    let (reload_tx, _) = broadcast::channel::<()>(16);

    info!("Building site...");
    let build_args = BuildSettings {
        config_path: config_path.clone(),
        output: args.output.clone(),
        drafts: args.drafts,
    };
    let initial = build_args.clone();
    let result = tokio::task::spawn_blocking(move || initial.build()).await??;

    let _watcher_handle = if args.watch {
        let classifier = PathClassifier::new(
            site_root_from_config(&config_path).canonicalize()?,
            result.output_dir.canonicalize()?,
            config_path.canonicalize()?,
        );

        match FileWatcher::new(&config.dev.watch, classifier) {
            Ok(watcher) => {
                info!("Watching for changes...");
                let watcher_reload_tx = reload_tx.clone();

                Some(tokio::task::spawn_blocking(move || {
                    while let Some(event) = watcher.recv() {
                        match event {
                            WatchEvent::FilesChanged(changes) => {
                                for change in &changes {
                                    if let Some(path) = change.path() {
                                        debug!("changed: {}", path.display());
                                    }
                                }
                                info!("Detected {} change(s), rebuilding...", changes.len());

                                match build_args.build() {
                                    // Notify connected browsers to reload
                                    Ok(_) => {
                                        let _ = watcher_reload_tx.send(());
                                    }
                                    Err(e) => error!("Build error: {:#}", e),
                                }
                            }
                            WatchEvent::Error(e) => warn!("Watch error: {}", e),
                        }
                    }
                }))
            }
            Err(e) => {
                warn!("Failed to start file watcher: {}", e);
                None
            }
        }
    } else {
        None
    };

    let serve_dir = ServeDir::new(&result.output_dir).append_index_html_on_directories(true);

    let baseurl = match config.site.baseurl.trim_matches('/') {
        "" => String::new(),
        prefix => format!("/{}", prefix),
    };
    let router = Router::new().route("/_quill/live-reload", get(live_reload_handler));
    let router = if baseurl.is_empty() {
        router.fallback_service(serve_dir)
    } else {
        router.nest_service(&baseurl, serve_dir)
    };
    let app = router.with_state(reload_tx);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}{}/", display_host, args.port, baseurl);

    info!("Serving site at {}", url);
    info!("Press Ctrl+C to stop");

    if args.open
        && let Err(e) = open::that(&url)
    {
        warn!("Failed to open browser: {}", e);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Everything a dev rebuild needs, owned so it can move to a blocking task.
#[derive(Clone)]
struct BuildSettings {
    config_path: PathBuf,
    output: Option<PathBuf>,
    drafts: bool,
}

impl BuildSettings {
    /// Reload the config and build in dev mode. Document failures are logged
    /// by the build and do not stop the server.
    fn build(&self) -> Result<BuildResult, anyhow::Error> {
        let started = std::time::Instant::now();
        let config = Config::load_from_file(&self.config_path)?;
        let site_root = site_root_from_config(&self.config_path);
        let live_reload = config.dev.live_reload;

        let mut builder = Builder::new(config, site_root)
            .with_drafts(self.drafts)
            .with_dev_mode(true)
            .with_live_reload(live_reload);
        if let Some(output) = &self.output {
            builder = builder.with_output_dir(absolute(output)?);
        }
        let result = builder.build()?;

        info!(
            "Built {} documents, {} static files in {}",
            result.documents,
            result.static_files,
            format_elapsed(started.elapsed())
        );
        Ok(result)
    }
}
