use crate::common::Record;

/// A mutating call received by [`super::MemoryService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateZone(String),
    UpdateZone(String),
    DeleteZone(String),
    CreateRecord(String),
    UpdateRecord(String),
    DeleteRecord(String),
}

/// Selects calls which should fail, to simulate a provider outage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailOn {
    ListZones,
    /// Any create or update of a zone.
    WriteZone,
    DeleteZone,
    ListRecords,
    /// Any write or delete of the named record.
    Record(String),
}

pub(super) type MemoryRecords = std::collections::HashMap<String, Record>;
