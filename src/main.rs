use std::path::PathBuf;

use clap::{Parser, Subcommand, arg};
use log::{info, warn};
use slipstream::{
    AppConfig, ComparisonPayload, ComparisonRenderer, ComparisonSession, DriverSlot,
    FileBasedProvider, SlipstreamError, SlotChange, TrackGeometry, model::format_lap_time, writer,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
struct SessionArgs {
    /// Root directory of the lap data, defaults to the configured one
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[arg(short, long)]
    year: i32,

    #[arg(long)]
    venue: String,

    #[arg(short, long)]
    session: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the seasons, venues, sessions or drivers matching a query
    Browse {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(long)]
        venue: Option<String>,

        #[arg(short, long)]
        session: Option<String>,

        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Print the laps of one driver after invalid and outlier filtering
    Laps {
        #[command(flatten)]
        session: SessionArgs,

        #[arg(long)]
        driver: String,

        #[arg(long)]
        show_invalid: bool,

        #[arg(long)]
        show_outliers: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare one lap of each of two drivers
    Compare {
        #[command(flatten)]
        session: SessionArgs,

        #[arg(long)]
        first: String,

        #[arg(long)]
        first_lap: u32,

        #[arg(long)]
        second: String,

        #[arg(long)]
        second_lap: u32,

        /// Allow picking laps without a valid time
        #[arg(long)]
        show_invalid: bool,

        /// Allow picking laps slower than the outlier threshold
        #[arg(long)]
        show_outliers: bool,

        #[arg(short, long)]
        mini_sectors: Option<usize>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Prints the comparison to stdout
struct ConsoleRenderer {
    mini_sectors: usize,
}

impl ComparisonRenderer for ConsoleRenderer {
    fn draw_track_map(&mut self, track: &TrackGeometry) {
        println!(
            "Track map: {} points, {} corners",
            track.track.len(),
            track.corners.len()
        );
    }

    fn draw_dominance_map(&mut self, payload: &ComparisonPayload) {
        for side in [DriverSlot::First, DriverSlot::Second] {
            let data = payload.driver(side);
            println!(
                "{side}: {} lap {} in {}",
                data.driver, data.lap.lap_number, data.lap.lap_time
            );
        }
        for sector in payload.mini_sectors(self.mini_sectors) {
            let faster = match sector.faster {
                Some(side) => payload.driver(side).driver.abbreviation.clone(),
                None => "-".to_string(),
            };
            println!(
                "{:>3} {:>7.0}m - {:>7.0}m  {}",
                sector.index + 1,
                sector.start_m,
                sector.end_m,
                faster
            );
        }
    }
}

fn load_config() -> AppConfig {
    match AppConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            warn!("Could not read config file, using defaults: {e}");
            AppConfig::default()
        }
    }
}

fn open_provider(
    data_dir: Option<PathBuf>,
    config: &AppConfig,
) -> Result<FileBasedProvider, SlipstreamError> {
    let data_dir = data_dir
        .or_else(|| config.data_dir.clone())
        .ok_or(SlipstreamError::InvalidUserInput {
            field: "data-dir".to_string(),
            reason: "no data directory given or configured".to_string(),
        })?;
    FileBasedProvider::new(data_dir)
}

fn unknown(field: &str, value: &str) -> SlipstreamError {
    SlipstreamError::InvalidUserInput {
        field: field.to_string(),
        reason: format!("{value} is not available"),
    }
}

/// Walk the wizard through season, venue and session, checking each value against the
/// choices on offer
async fn select_session(
    session: &mut ComparisonSession<FileBasedProvider>,
    args: &SessionArgs,
) -> Result<(), SlipstreamError> {
    if !session.years().any(|year| *year == args.year) {
        return Err(unknown("year", &args.year.to_string()));
    }
    session.on_slot_changed(SlotChange::Year(args.year)).await?;
    session.advance().await?;

    let venue = session
        .venues()
        .find(|venue| venue.eq_ignore_ascii_case(&args.venue))
        .cloned()
        .ok_or_else(|| unknown("venue", &args.venue))?;
    session.on_slot_changed(SlotChange::Venue(venue)).await?;
    session.advance().await?;

    let session_type = session
        .session_types()
        .iter()
        .find(|session_type| session_type.eq_ignore_ascii_case(&args.session))
        .cloned()
        .ok_or_else(|| unknown("session", &args.session))?;
    session
        .on_slot_changed(SlotChange::SessionType(session_type))
        .await?;
    session.advance().await
}

async fn select_driver(
    session: &mut ComparisonSession<FileBasedProvider>,
    number: &str,
    driver_slot: DriverSlot,
) -> Result<(), SlipstreamError> {
    let driver = session
        .drivers()
        .find(|driver| driver.driver_number == number)
        .cloned()
        .ok_or_else(|| unknown("driver", number))?;
    let change = match driver_slot {
        DriverSlot::First => SlotChange::FirstDriver(driver),
        DriverSlot::Second => SlotChange::SecondDriver(driver),
    };
    session.on_slot_changed(change).await
}

async fn browse(
    data_dir: Option<PathBuf>,
    year: Option<i32>,
    venue: Option<String>,
    session_type: Option<String>,
    query: &str,
) -> Result<(), SlipstreamError> {
    let config = load_config();
    let provider = open_provider(data_dir.clone(), &config)?;
    let mut session = ComparisonSession::new(provider, &config);

    let Some(year) = year else {
        session
            .filter_years(query)
            .into_iter()
            .for_each(|year| println!("{year}"));
        return Ok(());
    };
    let Some(venue) = venue else {
        session.on_slot_changed(SlotChange::Year(year)).await?;
        session
            .filter_venues(query)
            .into_iter()
            .for_each(|venue| println!("{venue}"));
        return Ok(());
    };
    let Some(session_type) = session_type else {
        session.on_slot_changed(SlotChange::Year(year)).await?;
        session.advance().await?;
        session.on_slot_changed(SlotChange::Venue(venue)).await?;
        session
            .session_types()
            .iter()
            .for_each(|session_type| println!("{session_type}"));
        return Ok(());
    };

    select_session(
        &mut session,
        &SessionArgs {
            data_dir,
            year,
            venue,
            session: session_type,
        },
    )
    .await?;
    session
        .filter_drivers(query)
        .into_iter()
        .for_each(|driver| println!("{driver}"));
    Ok(())
}

async fn laps(
    args: SessionArgs,
    driver: &str,
    show_invalid: bool,
    show_outliers: bool,
    output: Option<PathBuf>,
) -> Result<(), SlipstreamError> {
    let config = load_config();
    let provider = open_provider(args.data_dir.clone(), &config)?;
    let mut session = ComparisonSession::new(provider, &config);
    select_session(&mut session, &args).await?;
    select_driver(&mut session, driver, DriverSlot::First).await?;

    session.show_laps(show_invalid, show_outliers);

    let series = session.chart_series();
    info!(
        "Plotting {} of {} laps",
        series.points.len(),
        session.analyzer().raw_laps().len()
    );
    for lap in session.display_laps() {
        let lap_time = lap
            .lap_time
            .seconds()
            .map(format_lap_time)
            .unwrap_or_else(|| lap.lap_time.to_string());
        println!(
            "{:>3}  {:>9}  {}",
            lap.lap_number,
            lap_time,
            lap.compound.as_deref().unwrap_or("-")
        );
    }
    if let Some(output) = output {
        writer::write_display_laps(&output, session.display_laps())?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn compare(
    args: SessionArgs,
    first: &str,
    first_lap: u32,
    second: &str,
    second_lap: u32,
    show_laps: (bool, bool),
    mini_sectors: Option<usize>,
    output: Option<PathBuf>,
) -> Result<(), SlipstreamError> {
    let (show_invalid, show_outliers) = show_laps;
    let config = load_config();
    let provider = open_provider(args.data_dir.clone(), &config)?;
    let mut session = ComparisonSession::new(provider, &config);
    select_session(&mut session, &args).await?;

    // picking a driver clears both chosen laps, so laps are picked once both drivers are set
    select_driver(&mut session, first, DriverSlot::First).await?;
    session.advance().await?;
    select_driver(&mut session, second, DriverSlot::Second).await?;
    // every lap load resets the toggles
    session.show_laps(show_invalid, show_outliers);
    session.select_lap_number(second_lap)?;
    session.retreat().await?;
    session.show_laps(show_invalid, show_outliers);
    session.select_lap_number(first_lap)?;

    let mut renderer = ConsoleRenderer {
        mini_sectors: mini_sectors.unwrap_or(config.mini_sectors),
    };
    let payload = session.run_comparison(&mut renderer).await?;
    if let Some(output) = output {
        writer::write_comparison(&output, payload)?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    match cli.command {
        Commands::Browse {
            data_dir,
            year,
            venue,
            session,
            query,
        } => browse(data_dir, year, venue, session, &query)
            .await
            .expect("Error while browsing lap data"),
        Commands::Laps {
            session,
            driver,
            show_invalid,
            show_outliers,
            output,
        } => laps(session, &driver, show_invalid, show_outliers, output)
            .await
            .expect("Error while loading laps"),
        Commands::Compare {
            session,
            first,
            first_lap,
            second,
            second_lap,
            show_invalid,
            show_outliers,
            mini_sectors,
            output,
        } => compare(
            session,
            &first,
            first_lap,
            &second,
            second_lap,
            (show_invalid, show_outliers),
            mini_sectors,
            output,
        )
        .await
        .expect("Error while comparing laps"),
    };
}
