//! Command-line interface for building a mosaic from a folder of images

use crate::algorithm::assembler::MosaicAssembler;
use crate::algorithm::pool::CandidatePool;
use crate::algorithm::random::RandomSelector;
use crate::analysis::report::UsageReport;
use crate::io::configuration::{
    DEFAULT_BLOCK_SIZE, DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_OUTPUT_FILE,
    DEFAULT_SEED, DEFAULT_TOLERANCE, FINGERPRINT_RESOLUTION, MosaicConfig,
};
use crate::io::error::{Result, invalid_argument};
use crate::io::image::{collect_palette_paths, export_raster, load_palette};
use crate::io::progress::{ProgressManager, ProgressObserver};
use crate::io::target::resolve_target_grid;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "lumamosaic")]
#[command(
    author,
    version,
    about = "Assemble a brightness-matched photo mosaic from a palette of images"
)]
/// Command-line arguments for the mosaic tool
pub struct Cli {
    /// Palette image files or directories of images
    #[arg(value_name = "PALETTE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// JSON file with rows of target brightness values (0-255)
    #[arg(short, long, value_name = "JSON")]
    pub target: Option<PathBuf>,

    /// Output image path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Output pixels per cell edge
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: u32,

    /// Maximum brightness difference accepted as a match
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    /// Rows of the random grid used when no target is given
    #[arg(long, default_value_t = DEFAULT_GRID_ROWS)]
    pub rows: usize,

    /// Columns of the random grid used when no target is given
    #[arg(long, default_value_t = DEFAULT_GRID_COLUMNS)]
    pub columns: usize,

    /// Write a JSON usage report to this path
    #[arg(short, long, value_name = "JSON")]
    pub report: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Mosaic configuration assembled from the arguments
    pub const fn config(&self) -> MosaicConfig {
        MosaicConfig {
            block_size: self.block_size,
            tolerance: self.tolerance,
            fingerprint_resolution: FINGERPRINT_RESOLUTION,
            default_grid_rows: self.rows,
            default_grid_columns: self.columns,
        }
    }
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` overrides the default level, which is `info` or `warn` when
/// `quiet` is set. Later calls are ignored.
pub fn init_logging(quiet: bool) {
    let default_directive = if quiet {
        "lumamosaic=warn"
    } else {
        "lumamosaic=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Runs one generation end to end: palette, target, assembly, export
pub struct MosaicProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl MosaicProcessor {
    /// Create a processor for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Build the mosaic and write it (and the optional report) to disk
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the configuration is invalid
    /// - no palette image could be found or decoded
    /// - the target grid file cannot be loaded
    /// - assembly or export fails
    pub fn process(&self) -> Result<UsageReport> {
        let result = self.run();
        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }
        result
    }

    /// Terminal progress bars, absent when running quietly
    pub const fn progress_manager(&self) -> Option<&ProgressManager> {
        self.progress_manager.as_ref()
    }

    fn run(&self) -> Result<UsageReport> {
        let config = self.cli.config();
        config.validate()?;

        let paths = collect_palette_paths(&self.cli.inputs)?;
        if paths.is_empty() {
            return Err(invalid_argument(
                "palette",
                &self.cli.inputs.len(),
                &"no palette images found in the given inputs",
            ));
        }

        let observer = self
            .progress_manager
            .as_ref()
            .map(|pm| pm as &dyn ProgressObserver);

        let palette = load_palette(&paths, config.fingerprint_resolution, observer);
        let mut pool = CandidatePool::new(palette.candidates)?;

        let mut rng = RandomSelector::new(self.cli.seed);
        let grid = resolve_target_grid(self.cli.target.as_deref(), &config, &mut rng)?;

        let mut assembler = MosaicAssembler::new(config);
        if let Some(observer) = observer {
            assembler = assembler.with_observer(observer);
        }
        let mosaic = assembler.assemble(&grid, &mut pool, &mut rng)?;
        let report = UsageReport::from_run(&grid, &pool, &mosaic);

        export_raster(mosaic.raster(), &self.cli.output)?;
        if let Some(report_path) = &self.cli.report {
            report.write_json(report_path)?;
        }

        info!(
            fresh = report.tiers.fresh,
            reused = report.tiers.reused,
            closest = report.tiers.closest,
            unused = report.unused_candidates,
            "mosaic complete"
        );
        Ok(report)
    }
}
