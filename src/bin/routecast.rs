use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use routecast::capture::InProcessEncoderFactory;
use routecast::services::{Geocoder, RouteTracker, resolve_stops};
use routecast::session::{DISPLAY_HZ, RealtimeDisplay, SteppedDisplay};
use routecast::{
    AnimationOpts, AnimationSession, ExportTarget, NominatimGeocoder, OsrmPathSource, Player,
    TripConfig, VehicleKind,
};

#[derive(Parser, Debug)]
#[command(name = "routecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up places by name.
    Search(SearchArgs),
    /// Resolve a trip's stops and print its path as GeoJSON.
    Route(TripArgs),
    /// Render one composed frame as a PNG.
    Frame(FrameArgs),
    /// Play the whole trip while recording it to a video file.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct SearchArgs {
    /// Free-text query.
    query: String,

    /// Return autocomplete suggestions instead of the best match.
    #[arg(long, default_value_t = false)]
    suggest: bool,

    /// Nominatim base URL.
    #[arg(long)]
    geocoding_url: Option<String>,
}

#[derive(Parser, Debug)]
struct TripArgs {
    /// Trip JSON file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the trip's vehicle.
    #[arg(long, value_enum)]
    vehicle: Option<VehicleKind>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    trip: TripArgs,

    /// Progress along the path in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    trip: TripArgs,

    /// Output directory; defaults to the trip's.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Step virtual time instead of waiting on the wall clock.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Record in-process as Y4M even when ffmpeg is available.
    #[arg(long, default_value_t = false)]
    y4m: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("routecast=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Search(args) => cmd_search(args).await,
        Command::Route(args) => cmd_route(args).await,
        Command::Frame(args) => cmd_frame(args).await,
        Command::Export(args) => cmd_export(args).await,
    }
}

async fn cmd_search(args: SearchArgs) -> anyhow::Result<()> {
    let defaults = TripConfig::default();
    let geocoder = NominatimGeocoder::new(
        args.geocoding_url.unwrap_or(defaults.geocoding_url),
        &defaults.user_agent,
    )?;
    let found = if args.suggest {
        geocoder.autocomplete(&args.query).await
    } else {
        geocoder.geocode(&args.query).await.into_iter().collect()
    };
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}

/// Load the trip, resolve its stops and compute the path.
async fn load_trip(
    args: &TripArgs,
) -> anyhow::Result<(TripConfig, Vec<routecast::LngLat>, routecast::Path)> {
    let mut trip = TripConfig::load(&args.in_path)?;
    if let Some(vehicle) = args.vehicle {
        trip.vehicle = vehicle;
    }
    let mut stops = trip.stop_list();
    let geocoder = NominatimGeocoder::new(trip.geocoding_url.clone(), &trip.user_agent)?;
    resolve_stops(&geocoder, &mut stops).await;
    let coords = stops.resolved_coords();

    let source = OsrmPathSource::new(trip.routing_url.clone(), &trip.user_agent)?;
    let mut routes = RouteTracker::new();
    routes.refresh(&source, &stops, trip.vehicle).await;
    let path = routes
        .into_path()
        .context("need at least two resolved stops to build a route")?;
    Ok((trip, coords, path))
}

fn session_for(
    trip: &TripConfig,
    coords: Vec<routecast::LngLat>,
    path: routecast::Path,
) -> anyhow::Result<AnimationSession> {
    let mut session = AnimationSession::new(trip.canvas, AnimationOpts::default())?;
    session.set_speed(trip.speed)?;
    session.set_vehicle(trip.vehicle)?;
    session.set_vehicle_size(trip.vehicle_size)?;
    session.set_stops(coords)?;
    session.set_path(Some(path))?;
    Ok(session)
}

async fn cmd_route(args: TripArgs) -> anyhow::Result<()> {
    let (_, _, path) = load_trip(&args).await?;
    eprintln!(
        "{} vertices, {:.1} km",
        path.vertex_count(),
        path.length_km()
    );
    println!("{}", serde_json::to_string_pretty(&path.to_geojson())?);
    Ok(())
}

async fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (trip, coords, path) = load_trip(&args.trip).await?;
    let mut session = session_for(&trip, coords, path)?;
    let frame = session.render_at(args.progress.clamp(0.0, 1.0))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let (trip, coords, path) = load_trip(&args.trip).await?;
    let mut session = session_for(&trip, coords, path)?.with_export_target(ExportTarget {
        dir: args.out_dir.unwrap_or_else(|| trip.output_dir.clone()),
        prefix: trip.file_prefix.clone(),
    });
    if args.y4m {
        session = session.with_encoder_factory(Arc::new(InProcessEncoderFactory));
    }
    let start = session.now();
    anyhow::ensure!(session.export(start), "recording could not start");

    // Twice the longest possible run at this speed, settle delay included.
    let opts = session.opts();
    let longest_secs =
        opts.duration.max.as_secs_f64() / trip.speed + opts.settle_delay.as_secs_f64();
    let max_frames = (longest_secs * f64::from(DISPLAY_HZ) * 2.0).ceil() as u64;
    let outcome = if args.offline {
        Player::new(SteppedDisplay::new(DISPLAY_HZ, start))
            .run_until_idle(&mut session, max_frames)
            .await?
    } else {
        Player::new(RealtimeDisplay::new(DISPLAY_HZ, start))
            .run_until_idle(&mut session, max_frames)
            .await?
    };
    session.end();

    if let Some(reason) = outcome.capture_error {
        anyhow::bail!(reason);
    }
    let written = outcome.exported.context("export produced no video")?;
    eprintln!("wrote {}", written.display());
    Ok(())
}
