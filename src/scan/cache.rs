use std::time::{Duration, Instant};

use crate::browser::dom::DomTree;
use crate::designer::error::DesignerError;
use crate::scan::field_model::Snapshot;
use crate::scan::locator::locate_fields;

/// How long a cached snapshot stays valid.
pub const SNAPSHOT_TTL: Duration = Duration::from_millis(2000);

/// Extraction seam for the cache. `BrowserSession` implements this against
/// the live page; tests use `StaticDomSource`.
pub trait DomSource {
    fn extract_dom(&mut self) -> Result<DomTree, DesignerError>;
}

/// Single-slot snapshot cache.
///
/// A full-page scan is expensive, so repeated callers within the validity
/// window share one snapshot. The slot is replaced wholesale on every
/// recomputation; there is no invalidation beyond age and explicit force.
/// Owned by whoever drives a page (the command layer), not module-global.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slot: Option<(Instant, Snapshot)>,
    ttl: Option<Duration>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache with a custom validity window (tests).
    pub fn with_ttl(ttl: Duration) -> Self {
        SnapshotCache {
            slot: None,
            ttl: Some(ttl),
        }
    }

    fn ttl(&self) -> Duration {
        self.ttl.unwrap_or(SNAPSHOT_TTL)
    }

    /// Return the cached snapshot if it is young enough, otherwise rescan.
    /// `force` always rescans.
    pub fn snapshot(
        &mut self,
        source: &mut dyn DomSource,
        force: bool,
    ) -> Result<Snapshot, DesignerError> {
        if !force {
            if let Some((taken_at, snapshot)) = &self.slot {
                if taken_at.elapsed() < self.ttl() {
                    return Ok(snapshot.clone());
                }
            }
        }

        let dom = source.extract_dom()?;
        let snapshot = Snapshot::from_report(locate_fields(&dom));
        self.slot = Some((Instant::now(), snapshot.clone()));
        Ok(snapshot)
    }

    /// Age of the cached snapshot, if any.
    pub fn age(&self) -> Option<Duration> {
        self.slot.as_ref().map(|(taken_at, _)| taken_at.elapsed())
    }
}

/// In-memory source for tests: serves clones of a fixed tree and counts
/// extraction passes.
pub struct StaticDomSource {
    tree: DomTree,
    pub extract_count: usize,
}

impl StaticDomSource {
    pub fn new(tree: DomTree) -> Self {
        Self {
            tree,
            extract_count: 0,
        }
    }
}

impl DomSource for StaticDomSource {
    fn extract_dom(&mut self) -> Result<DomTree, DesignerError> {
        self.extract_count += 1;
        Ok(self.tree.clone())
    }
}
