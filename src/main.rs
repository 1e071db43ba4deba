use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::Duration;
use telecast::catalog::MediaServerCatalog;
use telecast::config::{self, ChannelConfig, Config};
use telecast::epg::render_combined;
use telecast::error::{Error, Result};
use telecast::inventory::scan_inventory;
use telecast::m3u::render_m3u;
use telecast::pipeline::{CompileOutcome, compile_channel};
use telecast::publisher::{FfmpegPublisher, Publisher};
use telecast::schedule::Schedule;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "telecast", about = "24/7 TV channel schedule compiler")]
struct Cli {
    /// Config file (default: <config-dir>/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile schedules and playlists for one day
    Generate {
        /// Channel id (default: all channels, or $CHANNEL_ID)
        #[arg(short = 'C', long)]
        channel: Option<String>,
        /// Date to compile (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Shuffle seed for reproducible schedules
        #[arg(long)]
        seed: Option<u64>,
        /// Skip file-existence validation
        #[arg(long)]
        no_validate: bool,
    },
    /// Compile all channels, publish their streams, regenerate at midnight
    Run {
        /// Channel id (default: all channels, or $CHANNEL_ID)
        #[arg(short = 'C', long)]
        channel: Option<String>,
        /// Base directory for HLS output
        #[arg(long, default_value = "/stream")]
        stream_dir: PathBuf,
    },
    /// Print the combined XMLTV guide from persisted schedules
    Epg {
        /// Date to render (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Print the tuner channel list
    M3u {
        /// URL the streams are served from
        #[arg(long, default_value = "http://localhost:8001")]
        base_url: String,
    },
    /// List the scanned ad inventory
    Inventory,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .or_else(|| env::var("CONFIG_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| config::config_dir().join("config.json"));

    match cli.command {
        Commands::Generate {
            channel,
            date,
            seed,
            no_validate,
        } => {
            let config = Config::load(&config_path)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let mut rng = match seed {
                Some(s) => fastrand::Rng::with_seed(s),
                None => fastrand::Rng::new(),
            };
            let outcomes = compile_all(
                &config,
                &selected(&config, channel)?,
                date,
                &mut rng,
                !no_validate,
            )?;
            for (id, outcome) in &outcomes {
                println!(
                    "{}: {} shows, {} ad breaks -> {}",
                    id,
                    outcome.show_blocks,
                    outcome.ad_breaks,
                    outcome.playlist_path.display()
                );
            }
            Ok(())
        }
        Commands::Run {
            channel,
            stream_dir,
        } => {
            let config = Config::load(&config_path)?;
            run_channels(&config, channel, &stream_dir)
        }
        Commands::Epg { date } => {
            let config = Config::load(&config_path)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let schedules_dir = config::config_dir().join("schedules");

            let mut loaded: Vec<(Schedule, String)> = Vec::new();
            for ch in &config.channels {
                match Schedule::load(&schedules_dir, &ch.id, date) {
                    Ok(s) => loaded.push((s, ch.name.clone())),
                    Err(e) => warn!(channel = %ch.id, error = %e, "no schedule for guide"),
                }
            }
            let xml = render_combined(loaded.iter().map(|(s, n)| (s, n.as_str())));
            println!("{xml}");
            Ok(())
        }
        Commands::M3u { base_url } => {
            let config = Config::load(&config_path)?;
            print!("{}", render_m3u(&config.channels, &base_url));
            Ok(())
        }
        Commands::Inventory => {
            let config = Config::load(&config_path)?;
            let inventory = scan_inventory(&config.ads.directory, &config.ads.formats);
            for ad in &inventory {
                println!("{}\t{}", ad.title, ad.file_path.display());
            }
            println!("{} ad(s)", inventory.len());
            Ok(())
        }
    }
}

/// Resolve the channel filter: explicit flag, then $CHANNEL_ID, then all.
fn selected(config: &Config, filter: Option<String>) -> Result<Vec<ChannelConfig>> {
    let filter = filter.or_else(|| env::var("CHANNEL_ID").ok());
    match filter {
        Some(id) => Ok(vec![config.channel(&id)?.clone()]),
        None => Ok(config.channels.clone()),
    }
}

/// Compile each channel in isolation: one channel's failure is logged and
/// skipped. Errors out only when every channel fails.
fn compile_all(
    config: &Config,
    channels: &[ChannelConfig],
    date: NaiveDate,
    rng: &mut fastrand::Rng,
    validate: bool,
) -> Result<Vec<(String, CompileOutcome)>> {
    let catalog = MediaServerCatalog::new(&config.media_server.url, &config.media_server.api_key)?;
    let inventory = scan_inventory(&config.ads.directory, &config.ads.formats);
    let base_dir = config::config_dir();

    let mut outcomes = Vec::new();
    let mut last_err = None;
    for channel in channels {
        match compile_channel(channel, &catalog, &inventory, date, &base_dir, rng, validate) {
            Ok(outcome) => outcomes.push((channel.id.clone(), outcome)),
            Err(e) => {
                error!(channel = %channel.id, error = %e, "channel compilation failed");
                last_err = Some(e);
            }
        }
    }
    match (outcomes.is_empty(), last_err) {
        (true, Some(e)) => Err(e),
        _ => Ok(outcomes),
    }
}

/// Compile and publish every channel, then watch for the date change and
/// regenerate. Each channel's publisher is restarted on its new playlist.
fn run_channels(config: &Config, filter: Option<String>, stream_dir: &Path) -> Result<()> {
    let channels = selected(config, filter)?;
    let mut today = Local::now().date_naive();
    let mut rng = fastrand::Rng::new();
    let outcomes = compile_all(config, &channels, today, &mut rng, true)?;

    let mut publishers: Vec<FfmpegPublisher> = Vec::new();
    for (id, outcome) in &outcomes {
        let mut publisher = FfmpegPublisher::new(id, &outcome.playlist_path, stream_dir);
        match publisher.start() {
            Ok(()) => publishers.push(publisher),
            Err(e) => error!(channel = %id, error = %e, "publisher failed to start"),
        }
    }
    if publishers.is_empty() {
        return Err(Error::Publisher("no channels started".to_string()));
    }
    info!(channels = publishers.len(), "all streams up");

    // Minute-resolution watch for day rollover.
    loop {
        thread::sleep(Duration::from_secs(60));
        let now = Local::now().date_naive();
        if now == today {
            continue;
        }
        today = now;
        info!(date = %today, "date changed, regenerating schedules");

        for channel in &channels {
            let outcome = match compile_all(
                config,
                std::slice::from_ref(channel),
                today,
                &mut rng,
                true,
            ) {
                Ok(mut o) if !o.is_empty() => o.remove(0).1,
                Ok(_) => continue,
                Err(e) => {
                    error!(channel = %channel.id, error = %e, "regeneration failed");
                    continue;
                }
            };

            // Swap the publisher onto the new playlist: stop, then start.
            publishers.retain_mut(|p| {
                if p.channel_id != channel.id {
                    return true;
                }
                p.stop();
                false
            });
            let mut publisher =
                FfmpegPublisher::new(&channel.id, &outcome.playlist_path, stream_dir);
            match publisher.start() {
                Ok(()) => publishers.push(publisher),
                Err(e) => error!(channel = %channel.id, error = %e, "publisher restart failed"),
            }
        }
    }
}
