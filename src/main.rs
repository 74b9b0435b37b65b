use clap::{Args, Parser, Subcommand};
use culture_match::config::{LoggingSettings, Settings};
use culture_match::core::Matcher;
use culture_match::services::{
    InMemoryMatchStore, JsonExportSource, LogNotifier, MatchingJob, ProfileSource,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "culture-match",
    about = "Compute compatibility matches for Culture Connection members",
    version
)]
struct Cli {
    /// Configuration file to load instead of config/default.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh the match list of every member
    Run(RunArgs),
    /// Print the matches for a single member
    User(UserArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Profile export to read (overrides job.profiles_path)
    #[arg(long)]
    profiles: Option<PathBuf>,
    /// Write match records to this file as JSON
    #[arg(long)]
    output: Option<PathBuf>,
    /// Skip building notifications
    #[arg(long)]
    no_notify: bool,
}

#[derive(Args, Debug)]
struct UserArgs {
    /// Id of the member to match
    user_id: String,
    /// Profile export to read (overrides job.profiles_path)
    #[arg(long)]
    profiles: Option<PathBuf>,
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(io::stderr);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

fn to_io_error<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[tokio::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let settings = match loaded {
        Ok(settings) => {
            init_tracing(&settings.logging);
            settings
        }
        Err(e) => {
            init_tracing(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            return Err(to_io_error(e));
        }
    };

    info!("Configuration loaded successfully");

    let policy = settings.matching.policy();
    let matcher = Matcher::new(policy);

    info!("Matcher initialized with policy: {:?}", policy);

    match cli.command {
        Command::Run(args) => run_batch(settings, matcher, args).await,
        Command::User(args) => match_user(settings, matcher, args).await,
    }
}

async fn load_profiles(path: PathBuf) -> io::Result<Vec<culture_match::Profile>> {
    let export = JsonExportSource::new(path);
    info!("Loading profiles from {}", export.path().display());

    let source: Arc<dyn ProfileSource> = Arc::new(export);
    tokio::task::spawn_blocking(move || source.fetch_all())
        .await
        .map_err(to_io_error)?
        .map_err(|e| {
            error!("Failed to load profiles: {}", e);
            to_io_error(e)
        })
}

async fn run_batch(settings: Settings, matcher: Matcher, args: RunArgs) -> io::Result<()> {
    let profiles_path = args.profiles.unwrap_or(settings.job.profiles_path);
    let output_path = args.output.or(settings.job.output_path);
    let timeout = Duration::from_secs(settings.job.timeout_secs);

    let profiles = Arc::new(load_profiles(profiles_path).await?);

    let store = Arc::new(InMemoryMatchStore::new());
    let job = Arc::new(
        MatchingJob::new(matcher, store.clone(), Arc::new(LogNotifier))
            .with_notifications(settings.job.notifications_enabled && !args.no_notify),
    );

    let summary = job.run_bounded(profiles, timeout).await.map_err(|e| {
        error!("Matching run failed: {}", e);
        to_io_error(e)
    })?;

    if let Some(path) = output_path {
        let records = serde_json::to_vec_pretty(&store.records()).map_err(to_io_error)?;
        tokio::fs::write(&path, records).await?;
        info!("Wrote {} match records to {}", store.len(), path.display());
    }

    let body = serde_json::to_string_pretty(&summary).map_err(to_io_error)?;
    println!("{}", body);

    if summary.timed_out {
        error!("Matching run stopped after {:?} with {} records saved", timeout, summary.records_saved);
        return Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("matching run exceeded {:?}", timeout),
        ));
    }

    Ok(())
}

async fn match_user(settings: Settings, matcher: Matcher, args: UserArgs) -> io::Result<()> {
    let profiles_path = args.profiles.unwrap_or(settings.job.profiles_path);
    let profiles = load_profiles(profiles_path).await?;

    // A lone profile has nobody to match against
    if profiles.len() < 2 {
        info!("Not enough users for matching");
        println!("[]");
        return Ok(());
    }

    let user = profiles
        .iter()
        .find(|p| p.id == args.user_id)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("Profile not found for user {}", args.user_id),
            )
        })?;

    let matches = matcher.find_matches(user, &profiles);

    info!("Returning {} matches for user {}", matches.len(), user.id);

    let body = serde_json::to_string_pretty(&matches).map_err(to_io_error)?;
    println!("{}", body);

    Ok(())
}
