//! Synthetic session generator
//!
//! Back-fills the sessions table with plausible booth traffic for demos and
//! dashboard testing. Runs through the same validator, reducer, normalizer,
//! and store as the live ingestion path; only the commit stamp differs
//! (back-filled data stamps `timestamp` equal to `out_time`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveTime, TimeZone, Utc};
use clap::Parser;
use rand::Rng;
use serde_json::json;
use tracing::info;

use boothtrack_common::config::{self, ConfigOverrides, DEFAULT_BOOTH_ID};
use boothtrack_common::db::{init_database, SessionStore};
use boothtrack_common::reduce;
use boothtrack_common::scan::NewSession;
use boothtrack_common::time::TimeNormalizer;
use boothtrack_common::validate;

/// Booth open hours for generated dwell windows (local time)
const OPEN_HOUR: u32 = 10;
const CLOSE_HOUR: u32 = 16;

/// Dwell duration bounds in seconds
const MIN_DWELL_SECS: i64 = 30;
const MAX_DWELL_SECS: i64 = 300;

#[derive(Parser, Debug)]
#[command(name = "gen-sessions")]
#[command(about = "Back-fill synthetic dwell sessions for demos")]
#[command(version)]
struct Args {
    /// Number of sessions to generate
    #[arg(long, default_value_t = 25)]
    count: usize,

    /// SQLite database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Fixed timezone for generated timestamps (IANA name)
    #[arg(long)]
    timezone: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = config::resolve(ConfigOverrides {
        db_path: args.database,
        timezone: args.timezone,
        ..ConfigOverrides::default()
    })
    .context("Failed to resolve configuration")?;

    let pool = init_database(&config.db_path)
        .await
        .context("Failed to initialize database")?;
    let store = SessionStore::new(pool);
    let normalizer = TimeNormalizer::new(config.timezone);

    let open_epoch = booth_open_epoch(&normalizer)?;
    let mut rng = rand::thread_rng();

    for _ in 0..args.count {
        let session = generate_session(&mut rng, &normalizer, open_epoch)?;
        store.insert(&session).await?;
    }

    info!(
        "Inserted {} synthetic sessions into {}",
        args.count,
        config.db_path.display()
    );
    store.close().await;

    Ok(())
}

/// Today's booth opening instant as epoch seconds in the fixed zone
fn booth_open_epoch(normalizer: &TimeNormalizer) -> Result<i64> {
    let tz = normalizer.zone();
    let today = Utc::now().with_timezone(&tz).date_naive();
    let open_time = NaiveTime::from_hms_opt(OPEN_HOUR, 0, 0).context("invalid opening time")?;
    let open = tz
        .from_local_datetime(&today.and_time(open_time))
        .earliest()
        .context("ambiguous opening time")?;
    Ok(open.timestamp())
}

fn generate_session(
    rng: &mut impl Rng,
    normalizer: &TimeNormalizer,
    open_epoch: i64,
) -> Result<NewSession> {
    let device_id = random_device_id(rng);

    let sample_count: usize = rng.gen_range(4..=10);
    let rssi_values: Vec<i64> = (0..sample_count).map(|_| rng.gen_range(-80..=-20)).collect();

    let window_secs = i64::from(CLOSE_HOUR - OPEN_HOUR) * 3600;
    let in_epoch = open_epoch + rng.gen_range(0..window_secs - MAX_DWELL_SECS);
    let out_epoch = in_epoch + rng.gen_range(MIN_DWELL_SECS..=MAX_DWELL_SECS);

    let average_distance = (rng.gen_range(0.5_f64..=5.0) * 100.0).round() / 100.0;
    let booth_id: i64 = rng.gen_range(1..=5);

    // Same entry gate as live ingestion: raw payload through the validator
    let payload = json!({
        "device_id": device_id,
        "rssi_values": rssi_values,
        "in_time": in_epoch,
        "out_time": out_epoch,
        "average_distance": average_distance,
        "booth_id": booth_id,
    });
    let record = validate::validate(&payload)?;

    let user_retention = reduce::retention(&record.rssi_values);
    let in_time = normalizer.normalize(&record.in_time)?;
    let out_time = normalizer.normalize(&record.out_time)?;

    Ok(NewSession {
        booth_id: record.booth_id.unwrap_or(DEFAULT_BOOTH_ID),
        device_id: record.device_id,
        rssi_values: record.rssi_values,
        user_retention,
        in_time,
        // Back-filled records stamp commit time as the session end
        timestamp: out_time.clone(),
        out_time,
        average_distance: record.average_distance,
    })
}

/// Random MAC-address-style device id
fn random_device_id(rng: &mut impl Rng) -> String {
    (0..6)
        .map(|_| format!("{:02x}", rng.gen_range(0..=255u8)))
        .collect::<Vec<_>>()
        .join(":")
}
