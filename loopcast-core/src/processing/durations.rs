//! Per-run cache of probed media durations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::external::DurationProbe;

/// Probed durations keyed by path. Failed probes are cached as `None` so a
/// file is never probed twice in one run.
#[derive(Debug, Clone, Default)]
pub struct DurationCache {
    entries: HashMap<PathBuf, Option<f64>>,
}

impl DurationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached duration of `path`, probing it on first use.
    pub fn get<P: DurationProbe + ?Sized>(&mut self, probe: &P, path: &Path) -> Option<f64> {
        if let Some(cached) = self.entries.get(path) {
            return *cached;
        }
        let duration = probe.probe_duration(path);
        self.entries.insert(path.to_path_buf(), duration);
        duration
    }

    /// Sum of the known durations of `paths`; unknown ones contribute nothing.
    /// Returns `None` when the sum is not positive, i.e. progress cannot be computed.
    pub fn total<'a, P, I>(&mut self, probe: &P, paths: I) -> Option<f64>
    where
        P: DurationProbe + ?Sized,
        I: IntoIterator<Item = &'a Path>,
    {
        let total: f64 = paths
            .into_iter()
            .filter_map(|path| self.get(probe, path))
            .sum();
        (total > 0.0).then_some(total)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
