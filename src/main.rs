use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use vidseek::api::{ApiClient, MediaUrls, SearchQuery};
use vidseek::config::Config;
use vidseek::models::{SubmitRequest, VideoId};
use vidseek::player::timecode::resolve_fps;
use vidseek::state::{AppState, open_store};

/// Search a video retrieval backend and submit frames to the evaluation server.
#[derive(Parser)]
#[command(name = "vidseek", version)]
struct Cli {
    /// Path to configuration file (TOML). Defaults to the user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the evaluation server and store the session pair.
    Connect,

    /// Forget the stored session pair.
    Disconnect,

    /// Show connection state and server settings.
    Status,

    /// Run a visual or transcript search.
    Search {
        /// Free-text query.
        query: String,

        /// Search transcripts instead of keyframes.
        #[arg(long)]
        transcript: bool,

        /// Only show hits from this video.
        #[arg(long)]
        video: Option<String>,

        /// Submit the Nth listed hit (1-based).
        #[arg(long, value_name = "N")]
        submit: Option<usize>,
    },

    /// Submit a moment of a video.
    Submit {
        video_id: String,

        /// Frame number; converted with --fps.
        #[arg(long, conflicts_with = "seconds", required_unless_present = "seconds")]
        frame: Option<u64>,

        /// Frame rate for --frame. Defaults to the configured rate.
        #[arg(long, requires = "frame")]
        fps: Option<f64>,

        /// Time in seconds.
        #[arg(long)]
        seconds: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidseek=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    debug!("Using server {}", config.server.base_url);

    let client = ApiClient::new(&config.server).context("Failed to create API client")?;
    let store = open_store(&config.credentials).context("Failed to open credential store")?;
    let mut state = AppState::with_credentials(
        store
            .load()
            .context("Failed to load stored credentials")?,
    );

    match cli.command {
        Commands::Connect => {
            let credentials = client.login().await.context("Login failed")?;
            state.connect(credentials.clone(), store.as_ref())?;
            println!(
                "Connected: session {} evaluation {}",
                credentials.session_id, credentials.evaluation_id
            );
        }
        Commands::Disconnect => {
            state.disconnect(store.as_ref())?;
            println!("Disconnected");
        }
        Commands::Status => {
            println!("Server: {}", client.base_url());
            match state.credentials() {
                Some(c) => println!(
                    "Connected: session {} evaluation {}",
                    c.session_id, c.evaluation_id
                ),
                None => println!("Not connected"),
            }
        }
        Commands::Search {
            query,
            transcript,
            video,
            submit,
        } => {
            let query = if transcript {
                SearchQuery::transcript(query)
            } else {
                SearchQuery::visual(query)
            };
            match client.search(&query).await {
                Ok(results) => state.set_search_results(results),
                Err(e) => {
                    state.set_search_error(e.to_string());
                    bail!("Search failed: {}", e);
                }
            }
            state.filter_by_video(video.map(VideoId::from));

            let urls = MediaUrls::from_config(&config.server)?;
            let options = state.video_options();
            info!("Hits span {} videos", options.len());
            for card in state.result_cards(&urls) {
                println!(
                    "{:<20} {:<12} {:>6}  {}",
                    card.title, card.frame_label, card.time_label, card.detail
                );
            }

            if let Some(n) = submit {
                let visible = state.visible_results();
                let Some(item) = n.checked_sub(1).and_then(|i| visible.get(i)) else {
                    bail!("No hit #{} among {} listed", n, visible.len());
                };
                let request = SubmitRequest::for_result(
                    state.credentials(),
                    item,
                    config.playback.default_fps,
                )?;
                send_submission(&client, &request).await?;
            }
        }
        Commands::Submit {
            video_id,
            frame,
            fps,
            seconds,
        } => {
            let video_id = VideoId::from(video_id);
            let request = match (frame, seconds) {
                (Some(frame), _) => SubmitRequest::for_frame(
                    state.credentials(),
                    &video_id,
                    frame,
                    resolve_fps(fps, config.playback.default_fps),
                )?,
                (None, Some(seconds)) => {
                    SubmitRequest::build(state.credentials(), &video_id, seconds)?
                }
                (None, None) => bail!("Either --frame or --seconds is required"),
            };
            send_submission(&client, &request).await?;
        }
    }

    Ok(())
}

async fn send_submission(client: &ApiClient, request: &SubmitRequest) -> Result<()> {
    match client.submit(request).await {
        Ok(response) => {
            println!("Submitted {} at {} ms", request.video_id, request.time_ms);
            println!("{}", response);
            Ok(())
        }
        Err(e) if e.is_server_rejection() => bail!("Evaluation server rejected submit: {}", e),
        Err(e) => Err(e).context("Submit failed"),
    }
}
