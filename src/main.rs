use anyhow::{Context, Result};
use chartscope::config::AppConfig;
use chartscope::data::Dataset;
use chartscope::query::{
    ArtistDetail, Catalog, QueryError, TopTrack, TrackRollup, TrackSelection, WeeksPolicy,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chartscope", version, about = "Music chart history explorer")]
struct Cli {
    /// Weekly chart-appearance table (CSV)
    #[arg(long, global = true)]
    charts: Option<PathBuf>,

    /// Joined track/artist table (CSV)
    #[arg(long, global = true)]
    tracks: Option<PathBuf>,

    /// Config file (defaults to ~/.config/chartscope/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How weeks on chart are counted (overrides config)
    #[arg(long, value_enum, global = true)]
    weeks_policy: Option<WeeksArg>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum WeeksArg {
    /// Distinct chart weeks per track
    Distinct,
    /// Row count split across credited artists
    Apportioned,
}

impl From<WeeksArg> for WeeksPolicy {
    fn from(arg: WeeksArg) -> Self {
        match arg {
            WeeksArg::Distinct => WeeksPolicy::Distinct,
            WeeksArg::Apportioned => WeeksPolicy::Apportioned,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the years present in the chart table
    Years,

    /// Show the tracks with the most weeks on the chart in a year
    Top {
        /// Chart year
        year: i32,

        /// Number of results (defaults to config top_limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show details, chart performance and audio features for a track
    Track {
        /// Chart year
        year: i32,

        /// Track name (must be in the year's top tracks)
        name: String,

        /// Show details for one credited artist
        #[arg(short, long)]
        artist: Option<String>,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the per-track rollup table
    Rollup {
        /// Filter by track name (substring match)
        #[arg(short, long)]
        song: Option<String>,

        /// Number of results
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show dataset statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    // Resolve table paths: CLI > config > defaults
    let chart_path = config.chart_path(cli.charts);
    let track_path = config.track_path(cli.tracks);
    let policy = cli.weeks_policy.map(WeeksPolicy::from).unwrap_or(config.weeks_policy);

    let dataset = Dataset::load(&chart_path, &track_path).context("Failed to load chart data")?;
    let catalog = Catalog::new(&dataset, policy, config.top_limit)
        .context("Failed to build track rollup")?;

    match cli.command {
        Commands::Years => {
            let years = catalog.years();
            if years.is_empty() {
                println!("No chart weeks found.");
                return Ok(());
            }
            for year in years {
                println!("{year}");
            }
        }

        Commands::Top { year, limit } => {
            let top = catalog.top_tracks(year, limit).context("Query failed")?;
            if top.is_empty() {
                println!("No chart entries for {}.", year);
                return Ok(());
            }
            println!("Top {} Tracks for {}", top.len(), year);
            println!();
            print_top_table(&top);
        }

        Commands::Track { year, name, artist, json } => {
            let selection = match catalog.resolve(year, &name) {
                Ok(s) => s,
                Err(QueryError::NotFound(msg)) => {
                    println!("No data: {msg}");
                    return Ok(());
                }
                Err(e) => return Err(e).context("Query failed"),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&selection)?);
                return Ok(());
            }

            print_selection(&selection, artist.as_deref());
        }

        Commands::Rollup { song, limit, json } => {
            let pattern = song.map(|s| s.to_lowercase());
            let rows: Vec<&TrackRollup> = catalog
                .rollups()
                .iter()
                .filter(|r| match &pattern {
                    Some(p) => r.track_name.to_lowercase().contains(p),
                    None => true,
                })
                .take(limit)
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            if rows.is_empty() {
                println!("No tracks found.");
                return Ok(());
            }
            print_rollup_table(&rows);
        }

        Commands::Stats => {
            let report = catalog.dataset().report();
            let years = catalog.years();
            println!("Dataset Statistics");
            println!("==================");
            println!("Chart table:      {}", chart_path.display());
            println!("Track table:      {}", track_path.display());
            println!("Weekly rows:      {}", report.weekly_rows);
            println!("Dropped rows:     {} (unparseable chart_week)", report.weekly_dropped);
            println!("Track/artist rows: {}", report.track_rows);
            println!("Distinct tracks:  {}", catalog.rollups().len());
            if let (Some(first), Some(last)) = (years.first(), years.last()) {
                println!("Years:            {}-{} ({} total)", first, last, years.len());
            }
            println!("Weeks policy:     {:?}", policy);
            println!("Top list length:  {}", catalog.top_limit());
        }
    }

    Ok(())
}

/// Truncate a display string to `width` characters.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

fn display_number(value: Option<f64>) -> String {
    value.map_or_else(|| "Unknown".to_string(), |v| v.to_string())
}

/// Print a year ranking.
fn print_top_table(top: &[TopTrack]) {
    println!("{:>3}  {:<40} {:>6}", "#", "Track", "Weeks");
    println!("{}", "-".repeat(52));
    for (i, t) in top.iter().enumerate() {
        println!(
            "{:>3}  {:<40} {:>6}",
            i + 1,
            truncate(&t.track_name, 40),
            t.week_count
        );
    }
}

/// Print rollup rows.
fn print_rollup_table(rows: &[&TrackRollup]) {
    println!(
        "{:<24} {:<30} {:>4} {:>8} {:>5}  {}",
        "Track ID", "Track", "Year", "Duration", "Weeks", "Artists"
    );
    println!("{}", "-".repeat(100));
    for r in rows {
        println!(
            "{:<24} {:<30} {:>4} {:>8} {:>5}  {}",
            truncate(&r.track_id, 24),
            truncate(&r.track_name, 30),
            r.release_year,
            r.duration_formatted,
            r.weeks_on_chart,
            r.artist_names.join(" | "),
        );
    }
}

fn print_artist(detail: &ArtistDetail) {
    println!("Artist Name:  {}", detail.artist_name);
    println!("Popularity:   {}", display_number(detail.popularity));
    println!("Followers:    {}", display_number(detail.followers));
}

/// Print a resolved track selection.
fn print_selection(sel: &TrackSelection, artist: Option<&str>) {
    let r = &sel.rollup;

    println!("Track Details");
    println!("=============");
    println!("Track Name:   {}", r.track_name);
    println!("Track ID:     {}", r.track_id);
    println!("Release Year: {}", r.release_year);
    println!("Artist Type:  {} ({} credited)", r.artist_type, r.artist_count());
    println!("Duration:     {}", r.duration_formatted);
    println!("Weeks on Chart: {}", r.weeks_on_chart);
    println!("Charted:      {} to {}", r.first_chart_week, r.last_chart_week);
    println!();

    println!("Artist Details");
    println!("--------------");
    match artist {
        Some(name) => match r.artist_detail(name) {
            Some(detail) => print_artist(&detail),
            None => println!("\"{}\" is not credited on this track.", name),
        },
        None => {
            for (i, detail) in r.artists().enumerate() {
                if i > 0 {
                    println!();
                }
                print_artist(&detail);
            }
        }
    }
    println!();

    println!("Track Info");
    println!("----------");
    println!("Artist:       {}", sel.info.artist_name);
    println!("Popularity:   {}", display_number(sel.info.popularity));
    println!("Followers:    {}", display_number(sel.info.followers));
    println!("Explicit:     {}", if sel.info.explicit { "Yes" } else { "No" });
    println!();

    println!("Performance of \"{}\"", r.track_name);
    println!("{:<12} {:>8}", "Chart Week", "Position");
    println!("{}", "-".repeat(21));
    for p in &sel.performance {
        println!("{:<12} {:>8.1}", p.week.to_string(), p.average_position);
    }
    println!();

    println!("Audio Features");
    println!("--------------");
    println!(
        "Danceability {:.2}   Tempo {:.2}   Energy {:.2}   Valence {:.2}",
        sel.features.danceability, sel.features.tempo, sel.features.energy, sel.features.valence
    );
}
