use crate::{
    algorithm::acceptance::{AcceptancePolicy, AlwaysAccept, Decision},
    algorithm::cache::{CacheStats, DescriptorCache},
    algorithm::frontier::{BoundaryFrontier, FrontierState},
    algorithm::inpainter::{CompositeInpainter, InpaintPolicy},
    algorithm::priority::{PriorityPolicy, WeightedPriority},
    algorithm::search::{LinearSearchBest, SearchPolicy},
    analysis::descriptor::{DifferenceMetric, PatchDescriptor},
    analysis::pair::PatchPair,
    io::configuration::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PATCH_HALF_WIDTH, GIF_FRAME_DELAY_MS},
    io::error::{ErrorContext, InpaintError, Result, WithContext, invalid_parameter},
    io::progress::{CommitEvent, ProgressSink},
    io::visualization::VisualizationCapture,
    spatial::grid::{Connectivity, ImageGrid, Mask},
    spatial::patch::{Patch, Vertex},
    spatial::sources::SourcePatchCollection,
};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What to do with a vertex whose proposed match was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectAction {
    /// Re-queue the vertex, excluding rejected sources, up to `max_attempts`
    /// proposals per pass before deferring it
    Retry {
        /// Proposals allowed per vertex per pass
        max_attempts: usize,
    },
    /// Defer the vertex until the end of the pass
    Skip,
}

impl Default for RejectAction {
    fn default() -> Self {
        Self::Retry {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Engine parameters for one inpainting run
#[derive(Clone, Copy, Debug)]
pub struct InpaintingConfig {
    /// Half-width of every patch
    pub half_width: usize,
    /// Adjacency defining the boundary
    pub connectivity: Connectivity,
    /// Handling of rejected proposals
    pub reject_action: RejectAction,
    /// Compute missing source descriptors on the rayon pool
    pub parallel: bool,
    /// Wall-clock budget for the whole run
    pub timeout: Option<Duration>,
    /// Compare the frontier against a brute-force recomputation after every commit
    pub verify_invariants: bool,
}

impl Default for InpaintingConfig {
    fn default() -> Self {
        Self {
            half_width: DEFAULT_PATCH_HALF_WIDTH,
            connectivity: Connectivity::default(),
            reject_action: RejectAction::default(),
            parallel: false,
            timeout: None,
            verify_invariants: false,
        }
    }
}

/// Shared flag for stopping a run between cycles
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; observed at the start of the next cycle
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InpaintingStatus {
    /// Every hole was filled
    Complete,
    /// A pass ended without any commit while holes remain
    Incomplete,
    /// Stopped by the cancellation token or the deadline
    Cancelled,
}

/// Summary of a finished run
#[derive(Clone, Debug)]
pub struct InpaintingReport {
    /// Terminal state
    pub status: InpaintingStatus,
    /// Hole vertices left, row-major
    pub remaining: Vec<Vertex>,
    /// Patches committed
    pub commits: usize,
    /// Driver iterations executed
    pub iterations: usize,
    /// Passes over the frontier
    pub passes: usize,
}

impl InpaintingReport {
    /// Check whether every hole was filled
    pub fn is_complete(&self) -> bool {
        self.status == InpaintingStatus::Complete
    }

    /// Turn a non-complete report into an error
    ///
    /// # Errors
    ///
    /// Returns `InpaintingIncomplete` listing the remaining holes unless the
    /// run completed
    pub fn ensure_complete(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(InpaintError::InpaintingIncomplete {
                remaining: self.remaining,
                commits: self.commits,
            })
        }
    }
}

/// Outcome of a single driver iteration
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IterationOutcome {
    /// The pair was committed
    Committed(PatchPair),
    /// The proposal was rejected and the vertex re-queued
    Rejected(PatchPair),
    /// The vertex was set aside until the end of the pass
    Deferred(Vertex),
    /// The frontier has no admissible vertex left in this pass
    PassEnded,
}

/// Priority-driven exemplar-based inpainting engine
///
/// Owns the image layers (layer 0 is the one patches are compared on), the
/// mask and every piece of incremental state. Each iteration pops the most
/// urgent boundary vertex, searches the source patches for the best match,
/// asks the acceptance policy, copies the patch into all layers and updates
/// the frontier, priorities and source collection around the fill.
pub struct InpaintingDriver {
    config: InpaintingConfig,
    layers: Vec<ImageGrid>,
    mask: Mask,
    frontier: BoundaryFrontier,
    sources: SourcePatchCollection,
    cache: DescriptorCache,
    priority: Box<dyn PriorityPolicy>,
    search: Box<dyn SearchPolicy>,
    acceptance: Box<dyn AcceptancePolicy>,
    inpainter: Box<dyn InpaintPolicy>,
    sinks: Vec<Box<dyn ProgressSink>>,
    /// Optional recording of every commit
    pub visualization: Option<VisualizationCapture>,
    cancellation: CancellationToken,
    /// Sources rejected per vertex; never offered to that vertex again
    rejected: HashMap<Vertex, BTreeSet<Patch>>,
    /// Proposals made per vertex in the current pass
    attempts: HashMap<Vertex, usize>,
    /// Vertices set aside until the end of the pass
    deferred: BTreeSet<Vertex>,
    iteration: usize,
    commits: usize,
    pass_commits: usize,
    passes: usize,
    initialized: bool,
}

impl InpaintingDriver {
    /// Create a driver with confidence priority, exhaustive sum-of-absolute
    /// search, automatic acceptance and a composite copy into every layer
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if there are no layers, a layer is not
    /// co-registered with the mask, or the half-width is zero
    pub fn new(layers: Vec<ImageGrid>, mask: Mask, config: InpaintingConfig) -> Result<Self> {
        if layers.is_empty() {
            return Err(invalid_parameter("layers", &0, &"at least one image is required"));
        }
        if let Some((index, layer)) = layers.iter().enumerate().find(|(_, l)| !mask.matches(l)) {
            return Err(invalid_parameter(
                "layers",
                &index,
                &format!(
                    "image is {}x{} but mask is {}x{}",
                    layer.rows(),
                    layer.cols(),
                    mask.rows(),
                    mask.cols()
                ),
            ));
        }
        if config.half_width == 0 {
            return Err(invalid_parameter(
                "half_width",
                &config.half_width,
                &"patches need a half-width of at least 1",
            ));
        }
        if let RejectAction::Retry { max_attempts: 0 } = config.reject_action {
            return Err(invalid_parameter(
                "max_attempts",
                &0,
                &"a vertex needs at least one attempt",
            ));
        }

        let sources = SourcePatchCollection::from_mask(&mask, config.half_width);
        let mut search = LinearSearchBest::new(DifferenceMetric::default());
        search.parallel = config.parallel;
        let layer_count = layers.len();

        Ok(Self {
            frontier: BoundaryFrontier::new(mask.rows(), mask.cols()),
            priority: Box::new(WeightedPriority::confidence(config.half_width)),
            search: Box::new(search),
            acceptance: Box::new(AlwaysAccept),
            inpainter: Box::new(CompositeInpainter::for_layers(layer_count)),
            sinks: Vec::new(),
            visualization: None,
            cancellation: CancellationToken::new(),
            cache: DescriptorCache::new(),
            rejected: HashMap::new(),
            attempts: HashMap::new(),
            deferred: BTreeSet::new(),
            iteration: 0,
            commits: 0,
            pass_commits: 0,
            passes: 0,
            initialized: false,
            config,
            layers,
            mask,
            sources,
        })
    }

    /// Replace the priority policy
    #[must_use]
    pub fn with_priority<P: PriorityPolicy + 'static>(mut self, priority: P) -> Self {
        self.priority = Box::new(priority);
        self.initialized = false;
        self
    }

    /// Replace the search policy
    #[must_use]
    pub fn with_search<S: SearchPolicy + 'static>(mut self, search: S) -> Self {
        self.search = Box::new(search);
        self
    }

    /// Replace the acceptance policy
    #[must_use]
    pub fn with_acceptance<A: AcceptancePolicy + 'static>(mut self, acceptance: A) -> Self {
        self.acceptance = Box::new(acceptance);
        self
    }

    /// Replace the inpainter
    #[must_use]
    pub fn with_inpainter<I: InpaintPolicy + 'static>(mut self, inpainter: I) -> Self {
        self.inpainter = Box::new(inpainter);
        self
    }

    /// Use an externally owned cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Register a telemetry sink
    pub fn add_sink<S: ProgressSink + 'static>(&mut self, sink: S) {
        self.sinks.push(Box::new(sink));
    }

    /// Handle for cancelling this run from elsewhere
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Enable GIF recording of the fill
    pub fn enable_visualization(&mut self) {
        if let Some(image) = self.layers.first() {
            self.visualization = Some(VisualizationCapture::new(image, &self.mask));
        }
    }

    /// Export visualization as GIF if enabled
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Visualization was not enabled
    /// - GIF export fails
    pub fn export_visualization(&self, output_path: &Path) -> Result<()> {
        self.visualization.as_ref().map_or_else(
            || {
                Err(invalid_parameter(
                    "visualization",
                    &"disabled",
                    &"Visualization was not enabled for this run",
                ))
            },
            |viz| viz.export_gif(output_path, GIF_FRAME_DELAY_MS),
        )
    }

    /// Image layers in their current state
    pub fn layers(&self) -> &[ImageGrid] {
        &self.layers
    }

    /// Consume the driver and return the image layers
    pub fn into_layers(self) -> Vec<ImageGrid> {
        self.layers
    }

    /// Current mask
    pub const fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Current frontier
    pub const fn frontier(&self) -> &BoundaryFrontier {
        &self.frontier
    }

    /// Current source patch collection
    pub const fn sources(&self) -> &SourcePatchCollection {
        &self.sources
    }

    /// Descriptor cache statistics
    pub const fn cache_stats(&self) -> &CacheStats {
        &self.cache.stats
    }

    /// Patches committed so far
    pub const fn commits(&self) -> usize {
        self.commits
    }

    /// Iterations executed so far
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Vertices currently deferred to the end of the pass
    pub fn deferred(&self) -> impl Iterator<Item = &Vertex> {
        self.deferred.iter()
    }

    /// Seed the priority policy and push every initial boundary vertex
    pub fn initialize(&mut self) {
        self.priority.initialize(&self.mask);
        self.frontier = BoundaryFrontier::new(self.mask.rows(), self.mask.cols());
        for vertex in self.mask.find_boundary(self.config.connectivity) {
            if self.deferred.contains(&vertex) {
                continue;
            }
            let priority = self.priority.priority(vertex, &self.mask);
            self.frontier.push(vertex, priority);
        }
        self.initialized = true;
    }

    /// Fill until complete, stuck, cancelled or out of time
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A source descriptor or copy touches a hole (internal inconsistency)
    /// - Descriptors or patches disagree in size
    /// - Invariant verification is enabled and the frontier is out of sync
    pub fn run(&mut self) -> Result<InpaintingReport> {
        if !self.initialized {
            self.initialize();
        }
        let started = Instant::now();
        info!(
            holes = self.mask.hole_count(),
            boundary = self.frontier.len(),
            sources = self.sources.len(),
            half_width = self.config.half_width,
            "starting inpainting"
        );

        let status = loop {
            if self.mask.hole_count() == 0 {
                break InpaintingStatus::Complete;
            }
            if self.cancellation.is_cancelled()
                || self.config.timeout.is_some_and(|t| started.elapsed() >= t)
            {
                break InpaintingStatus::Cancelled;
            }

            if self.run_iteration()? == IterationOutcome::PassEnded && !self.finish_pass() {
                break InpaintingStatus::Incomplete;
            }
        };

        let report = self.report(status);
        for sink in &mut self.sinks {
            sink.on_finish(report.remaining.len());
        }
        match status {
            InpaintingStatus::Complete => info!(
                commits = report.commits,
                iterations = report.iterations,
                elapsed_ms = started.elapsed().as_millis(),
                "inpainting complete"
            ),
            InpaintingStatus::Incomplete | InpaintingStatus::Cancelled => warn!(
                ?status,
                remaining = report.remaining.len(),
                commits = report.commits,
                "inpainting stopped before the hole was filled"
            ),
        }
        Ok(report)
    }

    /// Run a single Select, Describe, Search, Decide, Commit, Propagate cycle
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A source descriptor or copy touches a hole (internal inconsistency)
    /// - Descriptors or patches disagree in size
    /// - Invariant verification is enabled and the frontier is out of sync
    pub fn run_iteration(&mut self) -> Result<IterationOutcome> {
        if !self.initialized {
            self.initialize();
        }
        self.iteration += 1;

        // Phase 1: Select the most urgent boundary vertex
        let Some(vertex) = self.select() else {
            return Ok(IterationOutcome::PassEnded);
        };
        let context = ErrorContext {
            iteration: Some(self.iteration),
            commits: Some(self.commits),
            vertex: Some(vertex),
            operation: None,
        };

        // Phase 2: Describe the target patch, shifted inward at the image edge
        let Ok(target) = Patch::covering(vertex, self.config.half_width, &self.mask.bounds())
        else {
            debug!(?vertex, "image is smaller than a patch, deferring");
            self.defer(vertex);
            return Ok(IterationOutcome::Deferred(vertex));
        };

        // Phase 3: Search the source collection
        let Some(pair) = self.find_match(vertex, target).with_context(ErrorContext {
            operation: Some("search"),
            ..context.clone()
        })?
        else {
            debug!(?vertex, "no candidate source patch, deferring");
            self.defer(vertex);
            return Ok(IterationOutcome::Deferred(vertex));
        };

        // Phase 4: Decide
        if self.acceptance.decide(&pair) == Decision::Reject {
            return Ok(self.handle_rejection(vertex, pair));
        }

        // Phase 5: Commit into every layer, then the mask
        self.inpainter
            .inpaint(&mut self.layers, &self.mask, pair.source(), pair.target())
            .with_context(ErrorContext {
                operation: Some("commit"),
                ..context.clone()
            })?;
        let filled = self.mask.fill_region(pair.target().region());
        self.commits += 1;
        self.pass_commits += 1;
        debug!(
            target = ?pair.target().center(),
            source = ?pair.source().center(),
            filled = filled.len(),
            score = ?pair.total_score(),
            "committed patch"
        );

        // Phase 6: Propagate
        self.propagate(&pair, &filled);
        if self.config.verify_invariants {
            self.verify_invariants().with_context(ErrorContext {
                operation: Some("verify"),
                ..context
            })?;
        }

        Ok(IterationOutcome::Committed(pair))
    }

    fn select(&mut self) -> Option<Vertex> {
        let mask = &self.mask;
        let connectivity = self.config.connectivity;
        self.frontier
            .pop_max(|vertex| mask.is_boundary(vertex, connectivity))
            .map(|(vertex, _)| vertex)
    }

    fn find_match(&mut self, vertex: Vertex, target: Patch) -> Result<Option<PatchPair>> {
        let image = self
            .layers
            .first()
            .ok_or_else(|| invalid_parameter("layers", &0, &"at least one image is required"))?;

        if self.cache.len() < self.sources.len() {
            self.cache
                .ensure_sources(self.sources.iter(), image, &self.mask, self.config.parallel)?;
        }

        let excluded = self.rejected.get(&vertex);
        let candidates: Vec<&PatchDescriptor> = self
            .sources
            .iter()
            .filter(|patch| excluded.is_none_or(|set| !set.contains(patch)))
            .filter_map(|patch| self.cache.get(patch))
            .collect();

        let descriptor = PatchDescriptor::target(image, &self.mask, target);
        self.search.search(&descriptor, &candidates)
    }

    fn handle_rejection(&mut self, vertex: Vertex, pair: PatchPair) -> IterationOutcome {
        self.rejected
            .entry(vertex)
            .or_default()
            .insert(*pair.source());

        match self.config.reject_action {
            RejectAction::Retry { max_attempts } => {
                let attempts = self.attempts.entry(vertex).or_insert(0);
                *attempts += 1;
                if *attempts < max_attempts {
                    let priority = self.priority.priority(vertex, &self.mask);
                    self.frontier.push(vertex, priority);
                    IterationOutcome::Rejected(pair)
                } else {
                    self.defer(vertex);
                    IterationOutcome::Deferred(vertex)
                }
            }
            RejectAction::Skip => {
                self.defer(vertex);
                IterationOutcome::Deferred(vertex)
            }
        }
    }

    fn defer(&mut self, vertex: Vertex) {
        self.frontier.invalidate(vertex);
        self.deferred.insert(vertex);
    }

    /// End the current pass; returns whether another pass should run
    fn finish_pass(&mut self) -> bool {
        self.passes += 1;
        if self.pass_commits == 0 {
            return false;
        }
        if !self.deferred.is_empty() {
            warn!(
                deferred = self.deferred.len(),
                pass = self.passes,
                "re-queueing deferred boundary vertices"
            );
        }
        for vertex in std::mem::take(&mut self.deferred) {
            if self.mask.is_boundary(vertex, self.config.connectivity) {
                let priority = self.priority.priority(vertex, &self.mask);
                self.frontier.push(vertex, priority);
            }
        }
        self.attempts.clear();
        self.pass_commits = 0;
        true
    }

    fn propagate(&mut self, pair: &PatchPair, filled: &[Vertex]) {
        for &vertex in filled {
            self.frontier.mark_filled(vertex);
            self.deferred.remove(&vertex);
            self.rejected.remove(&vertex);
        }
        self.priority.update(pair.target(), filled, &self.mask);

        // New boundary vertices sit next to the fill; priorities change within a patch radius
        let bounds = self.mask.bounds();
        let affected = pair.target().region().expand(self.config.half_width, &bounds);
        for vertex in affected.vertices() {
            match self.frontier.state(vertex) {
                FrontierState::Active => {
                    let priority = self.priority.priority(vertex, &self.mask);
                    self.frontier.update_priority(vertex, priority);
                }
                FrontierState::NotBoundary
                    if !self.deferred.contains(&vertex)
                        && self.mask.is_boundary(vertex, self.config.connectivity) =>
                {
                    let priority = self.priority.priority(vertex, &self.mask);
                    self.frontier.push(vertex, priority);
                }
                FrontierState::NotBoundary | FrontierState::Filled => {}
            }
        }

        let added = self
            .sources
            .discover_after_fill(pair.target().region(), &self.mask);
        if added > 0 {
            debug!(added, total = self.sources.len(), "new source patches");
        }

        let Some(image) = self.layers.first() else {
            return;
        };
        let event = CommitEvent {
            iteration: self.iteration,
            commits: self.commits,
            pair,
            filled,
            remaining_holes: self.mask.hole_count(),
            image,
            mask: &self.mask,
        };
        if let Some(viz) = self.visualization.as_mut() {
            viz.on_commit(&event);
        }
        for sink in &mut self.sinks {
            sink.on_commit(&event);
        }
    }

    /// Compare the frontier with a brute-force boundary recomputation
    ///
    /// Active and deferred vertices together must be exactly the hole
    /// vertices adjacent to a valid vertex.
    ///
    /// # Errors
    ///
    /// Returns `FrontierMismatch` listing the disagreeing vertices
    pub fn verify_invariants(&self) -> Result<()> {
        let expected: BTreeSet<Vertex> = self
            .mask
            .find_boundary(self.config.connectivity)
            .into_iter()
            .collect();
        let mut tracked: BTreeSet<Vertex> = self.frontier.active_vertices().into_iter().collect();
        tracked.extend(self.deferred.iter().copied());

        if expected == tracked {
            return Ok(());
        }
        Err(InpaintError::FrontierMismatch {
            missing: expected.difference(&tracked).copied().collect(),
            unexpected: tracked.difference(&expected).copied().collect(),
        })
    }

    fn report(&self, status: InpaintingStatus) -> InpaintingReport {
        InpaintingReport {
            status,
            remaining: self.mask.holes(),
            commits: self.commits,
            iterations: self.iteration,
            passes: self.passes,
        }
    }
}
