use anyhow::{Context, Result};
use chrono::Local;
use std::sync::Arc;

use crate::alert::{AlertAssets, Alerter};
use crate::config::AppConfig;
use crate::models::LocationCell;
use crate::prayer_times::fetcher::build_client;
use crate::prayer_times::{
    Countdown, GeoSource, HttpTimetable, IpApi, RefreshLoop, Refresher, ScheduleStore, next_prayer,
    resolve_location,
};
use crate::utils::format::format_time;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Wiring ──────────────────────────────────────────────────────────────────

struct Services {
    refresher: Arc<Refresher>,
    geo: Option<Box<dyn GeoSource>>,
}

fn build_services(config: &AppConfig) -> Result<Services> {
    let client = build_client(&config.api).context("Building HTTP client")?;
    let source = HttpTimetable::new(client.clone(), &config.api.timings_url, config.location.method);
    let refresher = Arc::new(Refresher::new(
        Arc::new(source),
        ScheduleStore::new(),
        LocationCell::new(config.location.initial_location()),
    ));
    let geo: Option<Box<dyn GeoSource>> = if config.location.detect {
        Some(Box::new(IpApi::new(client, &config.api.geolocation_url)))
    } else {
        None
    };
    Ok(Services { refresher, geo })
}

// ─── TUI ─────────────────────────────────────────────────────────────────────

pub fn handle_tui(config: &AppConfig) -> Result<()> {
    let Services { refresher, geo } = build_services(config)?;

    let assets = AlertAssets::load(&config.alert.resolved_assets_dir());
    let alerter = Alerter::new(config.alert.clone(), assets);

    let refresh_loop = RefreshLoop::spawn(refresher.clone(), config.refresh.interval(), geo)
        .context("Starting refresh worker")?;

    crate::tui::app::run(refresher, refresh_loop, alerter)
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(config: &AppConfig) -> Result<()> {
    let Services { refresher, geo } = build_services(config)?;
    if let Some(geo) = geo {
        resolve_location(geo.as_ref(), refresher.location());
    }

    let location = refresher.location().get();
    let today = Local::now().date_naive();
    refresher
        .refresh_on(today)
        .with_context(|| format!("Fetching prayer times for {}", location.label()))?;

    let now = Local::now().naive_local();
    let schedule = refresher.store().snapshot();

    println!();
    println_colored!(GOLD, "  Prayer Times — {} ({})", location.label(), today);
    println!();

    for (name, at) in schedule.iter() {
        if at <= now {
            println_colored!(DIM, "  {:<10}  {}", name.display_name(), format_time(at.time()));
        } else {
            println_colored!(BOLD, "  {:<10}  {}", name.display_name(), format_time(at.time()));
        }
    }

    let countdown = Countdown::new(next_prayer(&schedule, now), now);
    println!();
    println_colored!(AMBER, "  {}  in {}", countdown.headline(), countdown.clock());
    println!();
    Ok(())
}

// ─── Locate ──────────────────────────────────────────────────────────────────

pub fn handle_locate(config: &AppConfig) -> Result<()> {
    let client = build_client(&config.api).context("Building HTTP client")?;
    let geo = IpApi::new(client, &config.api.geolocation_url);
    let location = LocationCell::new(config.location.initial_location());

    println!();
    if resolve_location(&geo, &location) {
        println_colored!(GOLD, "  Detected: {}", location.get().label());
    } else {
        println_colored!(RED, "  ✗ Could not detect location");
        println_colored!(DIM, "  Falling back to {}", location.get().label());
    }
    println!();
    Ok(())
}

// ─── Assets ──────────────────────────────────────────────────────────────────

pub fn handle_assets(config: &AppConfig) -> Result<()> {
    let assets = AlertAssets::load(&config.alert.resolved_assets_dir());

    println!();
    println_colored!(GOLD, "  Assets in {}", assets.dir.display());
    println!();

    let overrides = [
        ("Background override", &assets.background_override),
        ("Sound override", &assets.music_override),
    ];
    for (label, path) in overrides {
        match path {
            Some(p) => println_colored!(BOLD, "  {:<20} {}", label, p.display()),
            None => println_colored!(DIM, "  {:<20} none", label),
        }
    }

    println!();
    println_colored!(AMBER, "  Backgrounds ({})", assets.images.len());
    for image in &assets.images {
        println!("    {}", image.display());
    }
    println_colored!(AMBER, "  Sounds ({})", assets.sounds.len());
    for sound in &assets.sounds {
        println!("    {}", sound.display());
    }

    match &config.alert.player {
        Some(player) => println_colored!(DIM, "\n  Played with `{}`", player),
        None => println_colored!(DIM, "\n  No sound player configured; alerts are silent"),
    }
    println!();
    Ok(())
}
