//! Nearest-neighbor search over source patch descriptors
//!
//! Candidates are scanned in the order they are given, which the driver
//! derives from the source patch collection. Every search breaks distance
//! ties by scan position, so results are deterministic whether distances are
//! evaluated sequentially or in parallel.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::analysis::descriptor::{DifferenceMetric, PatchDescriptor};
use crate::analysis::pair::PatchPair;
use crate::io::error::{Result, invalid_parameter};

/// A scored candidate, identified by its position in the scan
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    /// Position in the candidate slice
    pub index: usize,
    /// Distance from the target
    pub distance: f32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Chooses a source patch for a target descriptor
pub trait SearchPolicy {
    /// Best match among `candidates`, or `None` if there are none
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` if the descriptors cannot be compared
    fn search(
        &self,
        target: &PatchDescriptor,
        candidates: &[&PatchDescriptor],
    ) -> Result<Option<PatchPair>>;
}

fn check_candidates(target: &PatchDescriptor, candidates: &[&PatchDescriptor]) -> Result<()> {
    match candidates.first() {
        Some(first) => DifferenceMetric::check_compatible(target, first),
        None => Ok(()),
    }
}

fn scored_pair(
    metric: &DifferenceMetric,
    target: &PatchDescriptor,
    source: &PatchDescriptor,
    distance: f32,
) -> PatchPair {
    let mut pair = PatchPair::new(*source.patch(), *target.patch());
    metric.record(&mut pair, distance);
    pair
}

/// Exhaustive scan returning the single closest candidate
#[derive(Debug, Clone, Default)]
pub struct LinearSearchBest {
    /// Distance used for ranking
    pub metric: DifferenceMetric,
    /// Evaluate candidates on the rayon thread pool
    pub parallel: bool,
}

impl LinearSearchBest {
    /// Create a sequential best-match search
    pub const fn new(metric: DifferenceMetric) -> Self {
        Self {
            metric,
            parallel: false,
        }
    }

    /// Closest candidate; ties go to the earliest in scan order
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` if the descriptors cannot be compared
    pub fn find_best(
        &self,
        target: &PatchDescriptor,
        candidates: &[&PatchDescriptor],
    ) -> Result<Option<Candidate>> {
        check_candidates(target, candidates)?;
        let score = |(index, source): (usize, &&PatchDescriptor)| Candidate {
            index,
            distance: self.metric.distance(target, source),
        };

        Ok(if self.parallel {
            candidates.par_iter().enumerate().map(score).min()
        } else {
            candidates.iter().enumerate().map(score).min()
        })
    }
}

impl SearchPolicy for LinearSearchBest {
    fn search(
        &self,
        target: &PatchDescriptor,
        candidates: &[&PatchDescriptor],
    ) -> Result<Option<PatchPair>> {
        let best = self.find_best(target, candidates)?;
        Ok(best.and_then(|c| {
            candidates
                .get(c.index)
                .map(|source| scored_pair(&self.metric, target, source, c.distance))
        }))
    }
}

/// Exhaustive scan keeping the `k` closest candidates
#[derive(Debug, Clone)]
pub struct LinearSearchKnn {
    /// Distance used for ranking
    pub metric: DifferenceMetric,
    /// Number of candidates kept
    pub k: usize,
    /// Evaluate candidates on the rayon thread pool
    pub parallel: bool,
}

impl LinearSearchKnn {
    /// Create a sequential k-best search
    pub const fn new(metric: DifferenceMetric, k: usize) -> Self {
        Self {
            metric,
            k,
            parallel: false,
        }
    }

    /// The `min(k, candidates.len())` closest candidates, ascending
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` if the descriptors cannot be compared
    pub fn find_k_best(
        &self,
        target: &PatchDescriptor,
        candidates: &[&PatchDescriptor],
    ) -> Result<Vec<Candidate>> {
        check_candidates(target, candidates)?;
        if self.k == 0 {
            return Ok(Vec::new());
        }
        let k = self.k;
        let score = |(index, source): (usize, &&PatchDescriptor)| Candidate {
            index,
            distance: self.metric.distance(target, source),
        };

        // Bounded max-heap: the worst kept candidate sits on top
        let keep = |mut heap: BinaryHeap<Candidate>, candidate: Candidate| {
            if heap.len() < k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
            heap
        };

        let heap = if self.parallel {
            candidates
                .par_iter()
                .enumerate()
                .map(score)
                .fold(BinaryHeap::new, keep)
                .reduce(BinaryHeap::new, |a, b| b.into_iter().fold(a, keep))
        } else {
            candidates
                .iter()
                .enumerate()
                .map(score)
                .fold(BinaryHeap::with_capacity(k.min(candidates.len())), keep)
        };

        Ok(heap.into_sorted_vec())
    }

    /// Ranked pairs for the k closest candidates
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` if the descriptors cannot be compared
    pub fn ranked_pairs(
        &self,
        target: &PatchDescriptor,
        candidates: &[&PatchDescriptor],
    ) -> Result<Vec<PatchPair>> {
        Ok(self
            .find_k_best(target, candidates)?
            .into_iter()
            .filter_map(|c| {
                candidates
                    .get(c.index)
                    .map(|source| scored_pair(&self.metric, target, source, c.distance))
            })
            .collect())
    }
}

impl SearchPolicy for LinearSearchKnn {
    fn search(
        &self,
        target: &PatchDescriptor,
        candidates: &[&PatchDescriptor],
    ) -> Result<Option<PatchPair>> {
        Ok(self.ranked_pairs(target, candidates)?.into_iter().next())
    }
}

/// Second stage of a two-step search: picks one entry of a shortlist
pub trait RefinementPolicy {
    /// Position of the chosen entry in `shortlist`, which is ordered by
    /// ascending coarse distance
    ///
    /// # Errors
    ///
    /// Returns an error if the refinement cannot compare the descriptors
    fn select(
        &self,
        target: &PatchDescriptor,
        shortlist: &[&PatchDescriptor],
    ) -> Result<Option<usize>>;

    /// Record refinement scores on the chosen pair
    fn annotate(&self, _target: &PatchDescriptor, _chosen: &PatchDescriptor, _pair: &mut PatchPair) {}
}

/// Re-rank the shortlist under a second metric
#[derive(Debug, Clone, Default)]
pub struct MetricRefinement {
    /// Metric applied to the shortlist only
    pub metric: DifferenceMetric,
}

impl RefinementPolicy for MetricRefinement {
    fn select(
        &self,
        target: &PatchDescriptor,
        shortlist: &[&PatchDescriptor],
    ) -> Result<Option<usize>> {
        Ok(LinearSearchBest::new(self.metric.clone())
            .find_best(target, shortlist)?
            .map(|c| c.index))
    }

    fn annotate(&self, target: &PatchDescriptor, chosen: &PatchDescriptor, pair: &mut PatchPair) {
        let distance = self.metric.distance(target, chosen);
        self.metric.record(pair, distance);
    }
}

/// Trust the coarse ranking and take its head
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCandidate;

impl RefinementPolicy for FirstCandidate {
    fn select(
        &self,
        _target: &PatchDescriptor,
        shortlist: &[&PatchDescriptor],
    ) -> Result<Option<usize>> {
        Ok((!shortlist.is_empty()).then_some(0))
    }
}

impl<F> RefinementPolicy for F
where
    F: Fn(&PatchDescriptor, &[&PatchDescriptor]) -> Option<usize>,
{
    fn select(
        &self,
        target: &PatchDescriptor,
        shortlist: &[&PatchDescriptor],
    ) -> Result<Option<usize>> {
        Ok(self(target, shortlist))
    }
}

/// Coarse k-best filter followed by a refinement policy
///
/// The refined choice is only guaranteed optimal under the refinement when
/// `k` covers every candidate; with a smaller `k` it is the best the
/// shortlist offers.
#[derive(Debug, Clone)]
pub struct TwoStepSearch<R> {
    /// Cheap first stage
    pub coarse: LinearSearchKnn,
    /// Second stage over the shortlist
    pub refinement: R,
}

impl<R: RefinementPolicy> TwoStepSearch<R> {
    /// Compose a coarse search with a refinement
    pub const fn new(coarse: LinearSearchKnn, refinement: R) -> Self {
        Self { coarse, refinement }
    }

    /// Shortlisted pairs as ranked by the coarse stage
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` if the descriptors cannot be compared
    pub fn shortlist(
        &self,
        target: &PatchDescriptor,
        candidates: &[&PatchDescriptor],
    ) -> Result<Vec<PatchPair>> {
        self.coarse.ranked_pairs(target, candidates)
    }
}

impl<R: RefinementPolicy> SearchPolicy for TwoStepSearch<R> {
    fn search(
        &self,
        target: &PatchDescriptor,
        candidates: &[&PatchDescriptor],
    ) -> Result<Option<PatchPair>> {
        let ranked = self.coarse.find_k_best(target, candidates)?;
        let shortlist: Vec<&PatchDescriptor> = ranked
            .iter()
            .filter_map(|c| candidates.get(c.index).copied())
            .collect();

        let Some(position) = self.refinement.select(target, &shortlist)? else {
            return Ok(None);
        };
        let (Some(chosen), Some(coarse)) = (shortlist.get(position), ranked.get(position)) else {
            return Err(invalid_parameter(
                "refinement",
                &position,
                &format!("shortlist has {} entries", shortlist.len()),
            ));
        };

        let mut pair = scored_pair(&self.coarse.metric, target, chosen, coarse.distance);
        self.refinement.annotate(target, chosen, &mut pair);
        Ok(Some(pair))
    }
}
