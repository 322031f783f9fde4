//! Command-line interface for inpainting a PNG image under a PNG mask

use crate::algorithm::executor::{InpaintingConfig, InpaintingDriver, InpaintingReport, RejectAction};
use crate::algorithm::priority::{Combination, PriorityTerm, RandomPriority, WeightedPriority};
use crate::algorithm::search::{LinearSearchBest, LinearSearchKnn, MetricRefinement, TwoStepSearch};
use crate::analysis::descriptor::DifferenceMetric;
use crate::analysis::gradient::gradient_magnitude;
use crate::analysis::weights::channel_weights;
use crate::io::configuration::{
    DEFAULT_CONFIDENCE_WEIGHT, DEFAULT_KNN_CANDIDATES, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_PATCH_HALF_WIDTH, DEFAULT_SEED, DEFAULT_STRUCTURE_WEIGHT, MAX_PATCH_HALF_WIDTH,
    OUTPUT_SUFFIX, VISUALIZATION_SUFFIX,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::{export_image, load_image, load_mask};
use crate::io::progress::ProgressBarSink;
use crate::spatial::grid::{Connectivity, ImageGrid, Mask};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Fill-order policy selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityKind {
    /// Weighted sum of confidence and structure
    Weighted,
    /// Product of confidence and structure raised to their weights
    Product,
    /// Seeded random order
    Random,
}

/// Per-pixel difference selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricKind {
    /// Sum of absolute differences
    Sad,
    /// Sum of squared differences
    Ssd,
}

#[derive(Parser)]
#[command(name = "patchfill")]
#[command(
    author,
    version,
    about = "Fill masked image regions by copying best-matching patches"
)]
/// Command-line arguments for the inpainting tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input PNG image
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Mask PNG; bright pixels mark the region to fill
    #[arg(value_name = "MASK")]
    pub mask: PathBuf,

    /// Patch half-width (patch side is 2 * h + 1)
    #[arg(short = 'p', long, default_value_t = DEFAULT_PATCH_HALF_WIDTH)]
    pub half_width: usize,

    /// Output path (defaults to <image>_filled.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Auxiliary image compared alongside the colors and filled with them
    #[arg(short, long)]
    pub auxiliary: Option<PathBuf>,

    /// Fill-order policy
    #[arg(long, value_enum, default_value_t = PriorityKind::Weighted)]
    pub priority: PriorityKind,

    /// Weight of the confidence term
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_WEIGHT)]
    pub confidence_weight: f32,

    /// Weight of the structure term
    #[arg(long, default_value_t = DEFAULT_STRUCTURE_WEIGHT)]
    pub structure_weight: f32,

    /// Patch difference
    #[arg(short, long, value_enum, default_value_t = MetricKind::Sad)]
    pub metric: MetricKind,

    /// Average the difference over compared pixels instead of summing
    #[arg(long)]
    pub average: bool,

    /// Shortlist K candidates, then refine on the hole boundary (K = 0 or
    /// omitted uses the default shortlist size)
    #[arg(long, value_name = "K", num_args = 0..=1, default_missing_value = "0")]
    pub two_step: Option<usize>,

    /// Evaluate candidates in parallel
    #[arg(short = 'j', long)]
    pub parallel: bool,

    /// Random seed for the random priority
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Enable visualization output as animated GIF
    #[arg(short, long)]
    pub visualize: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Stop after this many seconds
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,

    /// Treat dark mask pixels as the region to fill
    #[arg(short = 'i', long)]
    pub invert_mask: bool,

    /// Use 4-connectivity for the fill boundary
    #[arg(long)]
    pub four_connected: bool,

    /// Check frontier consistency after every commit
    #[arg(long)]
    pub verify: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Engine configuration from the arguments
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an out-of-range half-width or a
    /// negative or non-finite priority weight
    pub fn config(&self) -> Result<InpaintingConfig> {
        if self.half_width == 0 || self.half_width > MAX_PATCH_HALF_WIDTH {
            return Err(invalid_parameter(
                "half-width",
                &self.half_width,
                &format!("must be between 1 and {MAX_PATCH_HALF_WIDTH}"),
            ));
        }
        for (name, weight) in [
            ("confidence-weight", self.confidence_weight),
            ("structure-weight", self.structure_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid_parameter(
                    name,
                    &weight,
                    &"must be a finite non-negative number",
                ));
            }
        }

        Ok(InpaintingConfig {
            half_width: self.half_width,
            connectivity: if self.four_connected {
                Connectivity::Four
            } else {
                Connectivity::Eight
            },
            reject_action: RejectAction::Retry {
                max_attempts: DEFAULT_MAX_ATTEMPTS,
            },
            parallel: self.parallel,
            timeout: self.timeout_secs.map(Duration::from_secs),
            verify_invariants: self.verify,
        })
    }

    /// Difference metric with range weights for auxiliary channels
    pub fn metric(&self, image: &ImageGrid, auxiliary_channels: &[usize]) -> DifferenceMetric {
        let base = match self.metric {
            MetricKind::Sad => DifferenceMetric::sum_absolute(),
            MetricKind::Ssd => DifferenceMetric::sum_squared(),
        };
        let metric = base.with_weights(channel_weights(image, auxiliary_channels));
        if self.average { metric.averaged() } else { metric }
    }
}

/// Runs one inpainting job described by the command line
pub struct FileProcessor {
    cli: Cli,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Load inputs, fill the hole and write the outputs
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Arguments are invalid
    /// - The image, mask or auxiliary image cannot be loaded or differ in size
    /// - The engine reports an internal inconsistency
    /// - Any output cannot be written
    pub fn process(&self) -> Result<InpaintingReport> {
        let start_time = Instant::now();
        let config = self.cli.config()?;

        let image = load_image(&self.cli.image)?;
        let mask = load_mask(&self.cli.mask, self.cli.invert_mask)?;
        let auxiliary = self.cli.auxiliary.as_deref().map(load_image).transpose()?;
        let color_channels = image.channels();

        // Colors and auxiliary channels are matched and filled together
        let combined = match &auxiliary {
            Some(aux) => ImageGrid::stack(&[&image, aux])?,
            None => image.clone(),
        };
        let auxiliary_channels: Vec<usize> = (color_channels..combined.channels()).collect();
        let metric = self.cli.metric(&combined, &auxiliary_channels);
        let total_holes = mask.hole_count();

        info!(
            image = %self.cli.image.display(),
            rows = mask.rows(),
            cols = mask.cols(),
            holes = total_holes,
            "loaded inputs"
        );

        let mut driver = self.build_driver(combined, mask, config, metric, &image)?;
        if self.cli.visualize {
            driver.enable_visualization();
        }
        if self.cli.should_show_progress() {
            let name = self
                .cli
                .image
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            driver.add_sink(ProgressBarSink::new(&name, total_holes));
        }

        let report = driver.run()?;

        if self.cli.visualize && driver.commits() > 0 {
            driver.export_visualization(&Self::get_visualization_path(&self.cli.image))?;
        }

        let filled = driver
            .layers()
            .first()
            .ok_or_else(|| invalid_parameter("layers", &0, &"engine returned no image"))?;
        let output_path = self
            .cli
            .output
            .clone()
            .unwrap_or_else(|| Self::get_output_path(&self.cli.image));
        export_image(&filled.select_channels(0..color_channels)?, &output_path)?;

        if let Some(aux_path) = &self.cli.auxiliary {
            let aux = filled.select_channels(color_channels..filled.channels())?;
            export_image(&aux, &Self::get_output_path(aux_path))?;
        }

        info!(
            status = ?report.status,
            commits = report.commits,
            output = %output_path.display(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "finished"
        );
        Ok(report)
    }

    fn build_driver(
        &self,
        combined: ImageGrid,
        mask: Mask,
        config: InpaintingConfig,
        metric: DifferenceMetric,
        colors: &ImageGrid,
    ) -> Result<InpaintingDriver> {
        let structure = gradient_magnitude(colors, &mask);
        let mut driver = InpaintingDriver::new(vec![combined], mask, config)?;

        let terms = vec![
            (PriorityTerm::Confidence, self.cli.confidence_weight),
            (PriorityTerm::Structure, self.cli.structure_weight),
        ];
        driver = match self.cli.priority {
            PriorityKind::Weighted => driver.with_priority(
                WeightedPriority::new(config.half_width, terms, Combination::Sum)
                    .with_structure(structure),
            ),
            PriorityKind::Product => driver.with_priority(
                WeightedPriority::new(config.half_width, terms, Combination::Product)
                    .with_structure(structure),
            ),
            PriorityKind::Random => driver.with_priority(RandomPriority::new(self.cli.seed)),
        };

        driver = if let Some(k) = self.cli.two_step {
            let k = if k == 0 { DEFAULT_KNN_CANDIDATES } else { k };
            let mut coarse = LinearSearchKnn::new(metric.clone(), k);
            coarse.parallel = config.parallel;
            let refinement = MetricRefinement {
                metric: metric.boundary_only(),
            };
            driver.with_search(TwoStepSearch::new(coarse, refinement))
        } else {
            let mut search = LinearSearchBest::new(metric);
            search.parallel = config.parallel;
            driver.with_search(search)
        };

        Ok(driver)
    }

    /// `<stem>_filled.<ext>` next to the input
    pub fn get_output_path(input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let extension = input_path.extension().unwrap_or_default();
        let output_name = format!(
            "{}{}.{}",
            stem.to_string_lossy(),
            OUTPUT_SUFFIX,
            extension.to_string_lossy()
        );

        if let Some(parent) = input_path.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }

    /// `<stem>_fill.gif` next to the input
    pub fn get_visualization_path(input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let viz_name = format!("{}{VISUALIZATION_SUFFIX}.gif", stem.to_string_lossy());

        if let Some(parent) = input_path.parent() {
            parent.join(viz_name)
        } else {
            PathBuf::from(viz_name)
        }
    }
}
