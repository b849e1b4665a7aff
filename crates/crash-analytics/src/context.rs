//! The six datasets of one analysis run.

use crate::dataset::Dataset;
use crash_domain::DatasetKind;

/// Immutable datasets shared by every analysis.
///
/// Each slot starts as an empty dataset named after its kind; ingestion
/// replaces them through [`CrashContext::with_dataset`]. Datasets are
/// reference counted, so the context is cheap to clone and safe to share
/// between threads.
#[derive(Debug, Clone)]
pub struct CrashContext {
    charges: Dataset,
    damages: Dataset,
    endorse: Dataset,
    primary_person: Dataset,
    units: Dataset,
    restrict: Dataset,
}

impl CrashContext {
    pub fn new() -> Self {
        Self {
            charges: Dataset::empty(DatasetKind::Charges.as_str()),
            damages: Dataset::empty(DatasetKind::Damages.as_str()),
            endorse: Dataset::empty(DatasetKind::Endorse.as_str()),
            primary_person: Dataset::empty(DatasetKind::PrimaryPerson.as_str()),
            units: Dataset::empty(DatasetKind::Units.as_str()),
            restrict: Dataset::empty(DatasetKind::Restrict.as_str()),
        }
    }

    /// Install `dataset` as the given kind. The dataset is renamed after the
    /// kind so joined column names stay predictable.
    #[must_use]
    pub fn with_dataset(mut self, kind: DatasetKind, dataset: Dataset) -> Self {
        *self.slot_mut(kind) = dataset.renamed(kind.as_str());
        self
    }

    pub fn dataset(&self, kind: DatasetKind) -> &Dataset {
        match kind {
            DatasetKind::Charges => &self.charges,
            DatasetKind::Damages => &self.damages,
            DatasetKind::Endorse => &self.endorse,
            DatasetKind::PrimaryPerson => &self.primary_person,
            DatasetKind::Units => &self.units,
            DatasetKind::Restrict => &self.restrict,
        }
    }

    fn slot_mut(&mut self, kind: DatasetKind) -> &mut Dataset {
        match kind {
            DatasetKind::Charges => &mut self.charges,
            DatasetKind::Damages => &mut self.damages,
            DatasetKind::Endorse => &mut self.endorse,
            DatasetKind::PrimaryPerson => &mut self.primary_person,
            DatasetKind::Units => &mut self.units,
            DatasetKind::Restrict => &mut self.restrict,
        }
    }

    pub fn charges(&self) -> &Dataset {
        &self.charges
    }

    pub fn damages(&self) -> &Dataset {
        &self.damages
    }

    pub fn primary_person(&self) -> &Dataset {
        &self.primary_person
    }

    pub fn units(&self) -> &Dataset {
        &self.units
    }

    /// Row count of every dataset, in load order.
    pub fn row_counts(&self) -> Vec<(DatasetKind, usize)> {
        DatasetKind::ALL
            .into_iter()
            .map(|kind| (kind, self.dataset(kind).len()))
            .collect()
    }
}

impl Default for CrashContext {
    fn default() -> Self {
        Self::new()
    }
}
