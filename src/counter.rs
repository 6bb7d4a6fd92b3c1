use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, trace, warn};

use crate::building::{BuildingId, BuildingRepository};
use crate::config::CrossingConfig;
use crate::error::{CrossingError, InvariantError};
use crate::geom::{derived_tolerance, inflate, segment_intersects_footprint, Segment};
use crate::index::SpatialIndex;
use crate::matrix::{CrossingMatrix, MatrixBuilder};

/// Cooperative cancellation flag, checked between pair work items.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }

    /// Ask every worker to stop at its next pair.
    pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed) }

    #[inline] pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }
}

/// Work counters of one counting run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountStats {
    /// Distinct unordered pairs evaluated.
    pub pairs: u64,
    /// Candidate footprints returned by the index (or scanned) across all pairs.
    pub candidates: u64,
    /// Pairs whose index query failed and fell back to a full scan.
    pub index_fallbacks: u64,
}

impl CountStats {
    fn merge(self, other: Self) -> Self {
        Self {
            pairs: self.pairs + other.pairs,
            candidates: self.candidates + other.candidates,
            index_fallbacks: self.index_fallbacks + other.index_fallbacks,
        }
    }
}

/// A populated matrix and the work it took.
#[derive(Debug, Clone)]
pub struct CountOutcome {
    pub matrix: CrossingMatrix,
    pub stats: CountStats,
}

/// Counts, for every unordered pair of buildings, the other footprints
/// crossed by the segment joining their centroids.
#[derive(Debug)]
pub struct ObstructionCounter<'a> {
    repository: &'a BuildingRepository,
    index: Option<SpatialIndex>,
    epsilon: f64,
    threads: Option<usize>,
    cancel: CancelToken,
}

/// Counts of one row: pairs `(row, j)` for every `j > row`.
struct RowCounts {
    row: usize,
    counts: Vec<u32>,
    stats: CountStats,
}

impl<'a> ObstructionCounter<'a> {
    /// Prepare a counter over a loaded repository, building the spatial index
    /// unless the configuration disables it.
    pub fn new(repository: &'a BuildingRepository, config: &CrossingConfig) -> Result<Self, CrossingError> {
        config.validate()?;

        let epsilon = config.epsilon.unwrap_or_else(|| {
            repository.bounds().map(|b| derived_tolerance(&b)).unwrap_or(0.0)
        });
        let index = config.use_index.then(|| SpatialIndex::build(repository));

        Ok(Self { repository, index, epsilon, threads: config.effective_threads(), cancel: CancelToken::default() })
    }

    /// Attach a cancellation token shared with the host.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Absolute tolerance used by the intersection predicate.
    #[inline] pub fn epsilon(&self) -> f64 { self.epsilon }

    /// Count the obstructions between a single pair of buildings.
    pub fn count_pair(&self, a: BuildingId, b: BuildingId) -> Result<u32, InvariantError> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        if i == j {
            return Ok(0);
        }
        Ok(self.count(i, j, &mut CountStats::default()))
    }

    /// Count every pair, one work item per building row.
    pub fn run(&self) -> Result<CountOutcome, CrossingError> {
        let rows = self.repository.ids().collect::<Vec<_>>();
        self.run_rows(&rows)
    }

    /// Count every pair, scheduling rows in the given order.
    ///
    /// `rows` must list every building exactly once; a missing row leaves
    /// cells unset and a repeated row writes cells twice, both of which fail
    /// the matrix postcondition.
    pub fn run_rows(&self, rows: &[BuildingId]) -> Result<CountOutcome, CrossingError> {
        let n = self.repository.count();
        let started = Instant::now();
        info!(
            buildings = n,
            pairs = n * n.saturating_sub(1) / 2,
            threads = ?self.threads,
            indexed = self.index.is_some(),
            epsilon = self.epsilon,
            "counting obstructions"
        );

        let work = || rows.par_iter()
            .map(|&id| self.count_row(id))
            .collect::<Result<Vec<_>, CrossingError>>();

        let results = match self.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new().num_threads(threads).build()?.install(work),
            None => work(),
        }?;

        // Every worker has joined; assemble the matrix single-threaded.
        let mut builder = MatrixBuilder::new(n);
        let mut stats = CountStats::default();
        for RowCounts { row, counts, stats: row_stats } in results {
            for (offset, count) in counts.into_iter().enumerate() {
                builder.record(row, row + 1 + offset, count)?;
            }
            stats = stats.merge(row_stats);
        }
        let matrix = builder.finish()?;

        info!(
            pairs = stats.pairs,
            candidates = stats.candidates,
            index_fallbacks = stats.index_fallbacks,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "counted obstructions"
        );
        Ok(CountOutcome { matrix, stats })
    }

    fn position(&self, id: BuildingId) -> Result<usize, InvariantError> {
        self.repository.get(id)
            .map(|_| id.index())
            .ok_or(InvariantError::UnknownBuilding(id))
    }

    fn count_row(&self, id: BuildingId) -> Result<RowCounts, CrossingError> {
        let row = self.position(id)?;
        let n = self.repository.count();
        let mut stats = CountStats::default();
        let mut counts = Vec::with_capacity(n - row - 1);

        for j in row + 1..n {
            if self.cancel.is_cancelled() {
                return Err(CrossingError::Cancelled);
            }
            counts.push(self.count(row, j, &mut stats));
        }

        trace!(%id, pairs = counts.len(), "row done");
        Ok(RowCounts { row, counts, stats })
    }

    /// Obstructions on the centroid segment of buildings `i` and `j` (positions).
    fn count(&self, i: usize, j: usize, stats: &mut CountStats) -> u32 {
        let buildings = self.repository.all();
        let segment = Segment::new(buildings[i].centroid(), buildings[j].centroid());
        stats.pairs += 1;
        self.count_segment(&segment, [i, j], stats)
    }

    /// Footprints touched by `segment`, skipping the positions in `skip`.
    fn count_segment(&self, segment: &Segment, skip: [usize; 2], stats: &mut CountStats) -> u32 {
        let buildings = self.repository.all();
        let hits = |k: usize| {
            !skip.contains(&k) && segment_intersects_footprint(segment, buildings[k].footprint(), self.epsilon)
        };

        let Some(index) = self.index.as_ref() else {
            stats.candidates += buildings.len() as u64;
            return (0..buildings.len()).filter(|&k| hits(k)).count() as u32;
        };

        match index.query(inflate(&segment.bbox(), self.epsilon)) {
            Ok(candidates) => {
                let mut count = 0;
                for id in candidates {
                    stats.candidates += 1;
                    if hits(id.index()) { count += 1; }
                }
                count
            }
            Err(error) => {
                warn!(%error, ?segment, "index query failed, scanning all footprints");
                stats.index_fallbacks += 1;
                stats.candidates += buildings.len() as u64;
                (0..buildings.len()).filter(|&k| hits(k)).count() as u32
            }
        }
    }
}
