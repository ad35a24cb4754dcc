use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use covid_dots::api::{self, Client, NATIONAL_URL, OWID_URL};
use covid_dots::batch::{self, BatchOptions, Outcome, Selection};
use covid_dots::config::SizingMode;
use covid_dots::models::{OwidDataset, RawSeries, TimeSeries};
use covid_dots::prepare::prepare;
use covid_dots::viz::{EstimatedText, GlyphText, TextRenderer};
use covid_dots::{ChartConfig, ChartError, stats, storage};
use log::{error, info, warn};
use num_format::{Locale, ToFormattedString};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

/// Exit code used when the data source could not be reached.
const EXIT_FETCH: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "covid-dots",
    version,
    about = "Render COVID-19 deaths as dot-density charts (1 black pixel = 1 victim)"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One chart per region of the aggregated dataset (English labels, adaptive size).
    World(WorldArgs),
    /// The national chart from the hospital + nursing-home feed (French labels).
    National(NationalArgs),
}

#[derive(Args, Debug)]
struct WorldArgs {
    /// Region code (e.g. FRA, GBR, OWID_WRL) or "all"
    #[arg(short, long, default_value = "all")]
    region: String,
    /// Render regions on all cores.
    #[arg(long, default_value_t = false)]
    parallel: bool,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct NationalArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Read the dataset from a local JSON file instead of downloading it.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Download from this URL instead of the default source.
    #[arg(long)]
    url: Option<String>,
    /// Directory for the PNG files (default: current directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// TrueType font for labels. Without it the chart is drawn without text.
    #[arg(long)]
    font: Option<PathBuf>,
    /// JSON chart configuration replacing the built-in preset.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum canvas width in adaptive sizing.
    #[arg(long)]
    width_bound: Option<u32>,
    /// Minimum height/width ratio in adaptive sizing.
    #[arg(long)]
    aspect: Option<f64>,
    /// Fixed pixels per day instead of the adaptive search.
    #[arg(long)]
    row_height: Option<u32>,
    /// Seed for reproducible dot placement.
    #[arg(long)]
    seed: Option<u64>,
    /// Fail on days that do not fit their band instead of clamping them.
    /// A shortfall of at most one column, left by rounding the canvas width, is still clamped.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Print per-series statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Save the prepared series (single series only) as .csv or .json.
    #[arg(long)]
    export: Option<PathBuf>,
    /// Print the effective configuration as JSON and exit.
    #[arg(long, default_value_t = false)]
    dump_config: bool,
}

impl CommonArgs {
    fn chart_config(&self, preset: ChartConfig) -> Result<ChartConfig> {
        let mut cfg = match &self.config {
            Some(p) => ChartConfig::from_json_file(p)
                .with_context(|| format!("load config {}", p.display()))?,
            None => preset,
        };
        if let Some(dir) = &self.out_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(font) = &self.font {
            cfg.fonts.path = Some(font.clone());
        }
        if let Some(w) = self.width_bound {
            cfg.layout.width_bound = w;
        }
        if let Some(a) = self.aspect {
            cfg.layout.aspect_ratio = a;
        }
        if let Some(row_height) = self.row_height {
            cfg.layout.sizing = SizingMode::Fixed { row_height };
        }
        cfg.strict_placement |= self.strict;
        Ok(cfg)
    }
}

fn text_renderer(cfg: &ChartConfig) -> Result<Box<dyn TextRenderer>> {
    match &cfg.fonts.path {
        Some(p) => Ok(Box::new(GlyphText::load(p)?)),
        None => {
            warn!("no font configured (--font); labels are left out");
            Ok(Box::new(EstimatedText))
        }
    }
}

fn fmt_count(v: u64) -> String {
    v.to_formatted_string(&Locale::en)
}

fn print_stats(series: &TimeSeries) {
    let s = stats::summarize(series);
    let day = |d: Option<(chrono::NaiveDate, u64)>| match d {
        Some((date, v)) => format!("{} on {}", fmt_count(v), date),
        None => "NA".to_string(),
    };
    println!(
        "{}  days={} total={} peak={} peak(smoothed)={} mean={:.1} last7={}",
        s.id,
        s.days,
        fmt_count(s.total),
        day(s.peak_daily),
        day(s.peak_smoothed),
        s.mean_daily.unwrap_or(0.0),
        fmt_count(s.last_week_average)
    );
}

fn export(series: &TimeSeries, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("csv") {
        "json" => storage::save_json(series, path)?,
        "csv" => storage::save_csv(series, path)?,
        other => bail!("unsupported export format: {}", other),
    }
    eprintln!("Saved {} days to {}", series.len(), path.display());
    Ok(())
}

/// Prepare a series for stats/export; series without usable data are left out.
fn prepare_for_report(
    id: &str,
    location: &str,
    raw: &RawSeries,
    cfg: &ChartConfig,
) -> Option<TimeSeries> {
    match prepare(id, location, raw, &cfg.smoothing) {
        Ok(s) => Some(s),
        Err(e) if e.is_no_usable_data() => {
            info!("{location} ({id}): no cumulative total reported, nothing to report");
            None
        }
        Err(e) => {
            warn!("{location} ({id}): {e}");
            None
        }
    }
}

/// Stats and export work on the prepared series; rendering prepares its own copy.
fn report_series(common: &CommonArgs, prepared: &[TimeSeries]) -> Result<()> {
    if common.stats {
        for s in prepared {
            print_stats(s);
        }
    }
    if let Some(path) = &common.export {
        match prepared {
            [single] => export(single, path)?,
            [] => warn!("nothing to export to {}", path.display()),
            _ => bail!("--export needs exactly one series, got {}", prepared.len()),
        }
    }
    Ok(())
}

fn summarize_outcomes(outcomes: &[Outcome]) -> ExitCode {
    let (mut rendered, mut skipped, mut failed) = (0, 0, 0);
    for o in outcomes {
        match o {
            Outcome::Rendered(r) => {
                rendered += 1;
                if !r.clamped_days.is_empty() {
                    warn!("{}: {} day(s) clamped to band capacity", r.id, r.clamped_days.len());
                }
            }
            Outcome::Skipped { .. } => skipped += 1,
            Outcome::Failed { id, error } => {
                failed += 1;
                error!("{id}: {error}");
            }
        }
    }
    info!("{rendered} chart(s) rendered, {skipped} skipped, {failed} failed");
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn load_world(common: &CommonArgs) -> Result<OwidDataset> {
    let dataset = match &common.input {
        Some(p) => api::read_owid_file(p)?,
        None => Client::new()?.fetch_owid(common.url.as_deref().unwrap_or(OWID_URL))?,
    };
    info!("dataset loaded: {} regions", dataset.len());
    Ok(dataset)
}

fn cmd_world(args: WorldArgs) -> Result<ExitCode> {
    let cfg = args.common.chart_config(ChartConfig::world())?;
    if args.common.dump_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(ExitCode::SUCCESS);
    }
    let selection: Selection = args.region.parse()?;
    let dataset = load_world(&args.common)?;

    if args.common.stats || args.common.export.is_some() {
        let prepared: Vec<TimeSeries> = dataset
            .iter()
            .filter(|(id, _)| match &selection {
                Selection::All => true,
                Selection::Region(code) => *id == code,
            })
            .filter_map(|(id, region)| {
                let raw = RawSeries::Direct(region.data.clone());
                prepare_for_report(id, &region.location, &raw, &cfg)
            })
            .collect();
        report_series(&args.common, &prepared)?;
    }

    let text = text_renderer(&cfg)?;
    let opts = BatchOptions {
        seed: args.common.seed,
        parallel: args.parallel,
    };
    let outcomes = batch::render_dataset(&dataset, &selection, &cfg, text.as_ref(), opts);
    Ok(summarize_outcomes(&outcomes))
}

fn cmd_national(args: NationalArgs) -> Result<ExitCode> {
    let cfg = args.common.chart_config(ChartConfig::national())?;
    if args.common.dump_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(ExitCode::SUCCESS);
    }
    let days = match &args.common.input {
        Some(p) => api::read_national_file(p)?,
        None => Client::new()?.fetch_national(args.common.url.as_deref().unwrap_or(NATIONAL_URL))?,
    };

    if args.common.stats || args.common.export.is_some() {
        let raw = RawSeries::Components(days.clone());
        let prepared: Vec<TimeSeries> = prepare_for_report("FRA", "France", &raw, &cfg)
            .into_iter()
            .collect();
        report_series(&args.common, &prepared)?;
    }

    let text = text_renderer(&cfg)?;
    let outcome = batch::render_national(days, &cfg, text.as_ref(), args.common.seed);
    Ok(summarize_outcomes(&[outcome]))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let started = Instant::now();
    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::World(args) => cmd_world(args),
        Command::National(args) => cmd_national(args),
    };
    let code = match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            match e.downcast_ref::<ChartError>() {
                Some(ce) if ce.is_fetch() => ExitCode::from(EXIT_FETCH),
                _ => ExitCode::FAILURE,
            }
        }
    };
    info!("-- Execution time: {:.2?} --", started.elapsed());
    code
}
