//! regrowth CLI - vegetation recovery metrics from yearly composites

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use regrowth_algorithms::recovery::{PipelineConfig, RecoveryPipeline};
use regrowth_core::io::{read_geotiff, write_geotiff, GeoTiffOptions};
use regrowth_core::{Algorithm, Raster, VegetationIndex, YearPlane};
use regrowth_parallel::ProcessingMode;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "regrowth")]
#[command(author, version, about = "Post-disturbance vegetation recovery metrics", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Print the default pipeline configuration as JSON
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the full recovery pipeline and write the metric rasters
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Yearly composite as YEAR=PATH (repeat for every year)
    #[arg(short, long = "input", value_parser = parse_year_input, required = true)]
    inputs: Vec<(i32, PathBuf)>,
    /// Directory for years_to_recovery.tif, slope.tif, abs_regrowth.tif, rel_regrowth.tif
    #[arg(short, long)]
    out_dir: PathBuf,
    /// Vegetation index of the composites: nbr, ndvi, savi
    #[arg(long)]
    index: Option<VegetationIndex>,
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Maximum number of missing years for a valid pixel (exclusive)
    #[arg(long)]
    valid_num: Option<usize>,
    /// The two pre-event baseline years, e.g. 1985,1986
    #[arg(long, value_delimiter = ',')]
    pre_years: Option<Vec<i32>>,
    /// First post-event year
    #[arg(long)]
    post_year: Option<i32>,
    /// Disturbance threshold as a fraction of the baseline
    #[arg(long)]
    threshold: Option<f64>,
    /// Year-axis index where the regrowth window starts
    #[arg(long)]
    window_offset: Option<usize>,
    /// Recovery target as a fraction of the baseline
    #[arg(long)]
    target: Option<f64>,
    /// Regrowth horizon in years
    #[arg(long)]
    horizon: Option<f64>,
    /// Recovery positions at or beyond this are discarded
    #[arg(long)]
    max_years: Option<f64>,
    /// Worker threads for the trend fit (1 = sequential, default all cores)
    #[arg(short, long)]
    threads: Option<usize>,
    /// Fit pixels in batches of this size
    #[arg(long)]
    batch_size: Option<usize>,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn parse_year_input(s: &str) -> std::result::Result<(i32, PathBuf), String> {
    let (year, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected YEAR=PATH, got '{}'", s))?;
    let year = year
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("bad year '{}': {}", year, e))?;
    if path.is_empty() {
        return Err(format!("missing path for year {}", year));
    }
    Ok((year, PathBuf::from(path)))
}

fn read_plane(year: i32, path: &Path) -> Result<YearPlane> {
    let raster: Raster<f64> = read_geotiff(path)
        .with_context(|| format!("Failed to read {} composite {}", year, path.display()))?;
    info!("{}: {} x {}", year, raster.cols(), raster.rows());
    Ok(YearPlane::new(year, raster))
}

fn read_planes(mut inputs: Vec<(i32, PathBuf)>) -> Result<Vec<YearPlane>> {
    inputs.sort_by_key(|(year, _)| *year);
    let pb = spinner(&format!("Reading {} composites...", inputs.len()));
    let planes = inputs
        .iter()
        .map(|(year, path)| read_plane(*year, path))
        .collect::<Result<Vec<_>>>();
    pb.finish_and_clear();
    planes
}

fn write_result(raster: &Raster<f64>, path: &Path) -> Result<()> {
    write_geotiff(raster, path, Some(GeoTiffOptions { nan_nodata: true }))
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn load_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            PipelineConfig::from_json(&text).context("Failed to parse config")?
        }
        None => PipelineConfig::default(),
    };

    if args.index.is_some() {
        config.vegetation_index = args.index;
    }
    if let Some(n) = args.valid_num {
        config.validity.valid_num = n;
    }
    if let Some(years) = &args.pre_years {
        match years.as_slice() {
            &[a, b] => config.anchors.pre_event_years = [a, b],
            _ => bail!("--pre-years takes exactly two years, got {}", years.len()),
        }
    }
    if let Some(year) = args.post_year {
        config.anchors.post_event_year = year;
    }
    if let Some(fraction) = args.threshold {
        config.disturbance.threshold_fraction = fraction;
    }
    if let Some(offset) = args.window_offset {
        config.trend.window_start_offset = offset;
    }
    if let Some(fraction) = args.target {
        config.recovery.target_fraction = fraction;
    }
    if let Some(years) = args.horizon {
        config.regrowth.horizon_years = years;
    }
    if let Some(years) = args.max_years {
        config.recovery.max_recovery_years = years;
    }
    if args.threads.is_some() {
        config.trend.mode = ProcessingMode::from_threads(args.threads);
    }
    if args.batch_size.is_some() {
        config.trend.batch_size = args.batch_size;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Commands ───────────────────────────────────────────────────────────

fn info_command(input: &Path) -> Result<()> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(input).context("Failed to read raster")?;
    pb.finish_and_clear();

    let (rows, cols) = raster.shape();
    let bounds = raster.bounds();
    let stats = raster.statistics();

    println!("File: {}", input.display());
    println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
    println!("Cell size: {}", raster.cell_size());
    println!(
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    );
    if let Some(crs) = raster.crs() {
        println!("CRS: {}", crs);
    }
    if let Some(nodata) = raster.nodata() {
        println!("NoData: {}", nodata);
    }
    println!("\nStatistics:");
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    println!(
        "  Valid cells: {} ({:.1}%)",
        stats.valid_count,
        100.0 * stats.valid_count as f64 / raster.len() as f64
    );
    Ok(())
}

fn config_command(output: Option<&Path>) -> Result<()> {
    let json = PipelineConfig::default().to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Default configuration saved to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_command(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;
    let planes = read_planes(args.inputs)?;

    let start = Instant::now();
    let pb = spinner("Fitting recovery trends...");
    let output = RecoveryPipeline
        .execute(planes, config)
        .context("Recovery pipeline failed");
    pb.finish_and_clear();
    let output = output?;
    let elapsed = start.elapsed();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let pb = spinner("Writing outputs...");
    let rasters = output.metrics.to_rasters()?;
    for (name, raster) in &rasters {
        write_result(raster, &args.out_dir.join(format!("{}.tif", name)))?;
    }
    let summary_path = args.out_dir.join("summary.json");
    let summary = serde_json::to_string_pretty(&output.summary)?;
    std::fs::write(&summary_path, summary + "\n")
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;
    pb.finish_and_clear();

    println!("{}", output.summary);
    done("Recovery metrics", &args.out_dir, elapsed);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => info_command(&input),
        Commands::Config { output } => config_command(output.as_deref()),
        Commands::Run(args) => run_command(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_input() {
        assert_eq!(
            parse_year_input("1995=data/nbr_1995.tif").unwrap(),
            (1995, PathBuf::from("data/nbr_1995.tif"))
        );
        assert!(parse_year_input("data/nbr_1995.tif").is_err());
        assert!(parse_year_input("19x5=a.tif").is_err());
        assert!(parse_year_input("1995=").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "regrowth",
            "run",
            "-i",
            "1985=a.tif",
            "-o",
            "out",
            "--index",
            "ndvi",
            "--pre-years",
            "1984,1985",
            "--target",
            "0.1",
            "--threads",
            "1",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.vegetation_index, Some(VegetationIndex::Ndvi));
        assert_eq!(config.anchors.pre_event_years, [1984, 1985]);
        assert_eq!(config.anchors.post_event_year, 1995);
        assert_eq!(config.recovery.target_fraction, 0.1);
        assert_eq!(config.trend.mode, ProcessingMode::Sequential);
    }

    fn write_i16_composite(path: &Path, values: &[i16], nodata: &str) {
        use tiff::encoder::{colortype::GrayI16, TiffEncoder};
        use tiff::tags::Tag;

        let file = std::fs::File::create(path).unwrap();
        let mut encoder = TiffEncoder::new(std::io::BufWriter::new(file)).unwrap();
        let mut image = encoder.new_image::<GrayI16>(values.len() as u32, 1).unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &[30.0f64, 30.0, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &[0.0f64, 0.0, 0.0, 620_000.0, 3_630_000.0, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::GeoKeyDirectoryTag, &[1u16, 1, 0, 1, 3072, 0, 1, 32652][..])
            .unwrap();
        image.encoder().write_tag(Tag::GdalNodata, nodata).unwrap();
        image.write_data(values).unwrap();
    }

    #[test]
    fn test_integer_composites_keep_georeferencing_and_nodata() {
        use regrowth_algorithms::timeseries::build_image_stack;

        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("nbr_1985.tif");
        let b = dir.path().join("nbr_1986.tif");
        write_i16_composite(&a, &[5200, -9999, 4800], "-9999");
        write_i16_composite(&b, &[-9999, 5100, 4700], "-9999");

        // given out of order on the command line
        let planes = read_planes(vec![(1986, b), (1985, a)]).unwrap();
        assert_eq!(planes[0].year, 1985);
        assert_eq!(planes[0].plane.nodata(), Some(-9999.0));

        let stack = build_image_stack(&planes, Some(VegetationIndex::Nbr)).unwrap();
        let first = stack.plane(0);
        assert_eq!(first[[0, 0]], 5200.0);
        assert!(first[[0, 1]].is_nan());
        assert!(stack.plane(1)[[0, 0]].is_nan());

        let meta = stack.meta();
        assert_eq!(meta.transform.origin_x, 620_000.0);
        assert_eq!(meta.transform.pixel_width, 30.0);
        assert_eq!(meta.crs.as_ref().and_then(|c| c.epsg()), Some(32652));
    }

    #[test]
    fn test_pre_years_needs_two_values() {
        let cli = Cli::try_parse_from([
            "regrowth",
            "run",
            "-i",
            "1985=a.tif",
            "-o",
            "out",
            "--pre-years",
            "1985",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(load_config(&args).is_err());
    }
}
