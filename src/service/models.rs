use crate::common::{Record, Zone};

/// A decision taken by [`super::DNSSync`].
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    ZoneCreated(Zone),
    ZoneUpdated(Zone),
    RecordCreated(Record),
    RecordUpdated { old: Record, new: Record },
    RecordDeleted(Record),
}

/// Receives each change once it has been applied, or planned on a dry run.
pub trait Observer {
    fn notify(&self, change: &Change);
}

impl<F: Fn(&Change)> Observer for F {
    fn notify(&self, change: &Change) {
        self(change)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub zones_created: usize,
    pub zones_updated: usize,
    pub records_created: usize,
    pub records_updated: usize,
    pub records_deleted: usize,
}

impl SyncReport {
    pub fn len(&self) -> usize {
        self.zones_created
            + self.zones_updated
            + self.records_created
            + self.records_updated
            + self.records_deleted
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(super) fn count(&mut self, change: &Change) {
        match change {
            Change::ZoneCreated(_) => self.zones_created += 1,
            Change::ZoneUpdated(_) => self.zones_updated += 1,
            Change::RecordCreated(_) => self.records_created += 1,
            Change::RecordUpdated { .. } => self.records_updated += 1,
            Change::RecordDeleted(_) => self.records_deleted += 1,
        }
    }
}
