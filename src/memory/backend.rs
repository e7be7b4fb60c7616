use std::collections::HashMap;

use crate::common::{ConflictSnafu, Record, ResponseSnafu, Result, Service, Zone};

use super::models::{FailOn, MemoryRecords, Operation};

const BACKEND_NAME: &str = "Memory";

/// In-process [`Service`] holding zones and records in maps.
///
/// Applies the same existence rules as a real provider, synchronously,
/// and journals every mutating call.
#[derive(Debug, Default)]
pub struct MemoryService {
    zones: HashMap<String, Zone>,
    records: HashMap<String, MemoryRecords>,
    journal: Vec<Operation>,
    fail_on: Vec<FailOn>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a zone and its records without journaling.
    pub fn with_zone(mut self, zone: Zone, records: Vec<Record>) -> Self {
        self.records.insert(
            zone.name.clone(),
            records
                .into_iter()
                .map(|r| (r.record_name().to_owned(), r))
                .collect(),
        );
        self.zones.insert(zone.name.clone(), zone);
        self
    }

    pub fn fail_on(&mut self, failure: FailOn) {
        self.fail_on.push(failure);
    }

    pub fn clear_failures(&mut self) {
        self.fail_on.clear();
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.get(name)
    }

    pub fn record(&self, zone: &str, name: &str) -> Option<&Record> {
        self.records.get(zone).and_then(|records| records.get(name))
    }

    pub fn journal(&self) -> &[Operation] {
        &self.journal
    }

    /// Drains the journal, returning what it held.
    pub fn take_journal(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.journal)
    }

    fn check_failure(&self, failure: FailOn) -> Result<()> {
        if self.fail_on.contains(&failure) {
            return ResponseSnafu {
                message: format!("{BACKEND_NAME}: injected failure on {failure:?}"),
            }
            .fail();
        }
        Ok(())
    }
}

impl Service for MemoryService {
    fn list_zones(&mut self) -> Result<Vec<Zone>> {
        self.check_failure(FailOn::ListZones)?;
        Ok(self.zones.values().cloned().collect())
    }

    fn write_zone(&mut self, zone: &Zone, create: bool) -> Result<()> {
        self.check_failure(FailOn::WriteZone)?;

        let exists = self.zones.contains_key(&zone.name);
        if exists && create {
            return ConflictSnafu {
                message: format!("zone {} already exists", zone.name),
            }
            .fail();
        }
        if !exists && !create {
            return ConflictSnafu {
                message: format!("zone {} doesn't exist", zone.name),
            }
            .fail();
        }

        self.zones.insert(zone.name.clone(), zone.clone());
        if create {
            self.records.insert(zone.name.clone(), MemoryRecords::new());
            self.journal.push(Operation::CreateZone(zone.name.clone()));
        } else {
            self.journal.push(Operation::UpdateZone(zone.name.clone()));
        }
        Ok(())
    }

    fn delete_zone(&mut self, zone: &Zone) -> Result<()> {
        self.check_failure(FailOn::DeleteZone)?;
        if self.zones.remove(&zone.name).is_some() {
            self.records.remove(&zone.name);
            self.journal.push(Operation::DeleteZone(zone.name.clone()));
        }
        Ok(())
    }

    fn list_records(&mut self, zone: &Zone) -> Result<Vec<Record>> {
        self.check_failure(FailOn::ListRecords)?;
        Ok(self
            .records
            .get(&zone.name)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    fn write_record(&mut self, zone: &Zone, old: Option<&Record>, record: &Record) -> Result<()> {
        self.check_failure(FailOn::Record(record.record_name().to_owned()))?;

        let records = self.records.entry(zone.name.clone()).or_default();
        let name = match old {
            Some(old) => old.record_name(),
            None => record.record_name(),
        };
        let exists = records.contains_key(name);
        match old {
            Some(_) if !exists => {
                return ConflictSnafu {
                    message: format!("record {name} doesn't exist"),
                }
                .fail()
            }
            None if exists => {
                return ConflictSnafu {
                    message: format!("conflict, record {name} exists"),
                }
                .fail()
            }
            _ => {}
        }

        if let Some(old) = old {
            records.remove(old.record_name());
            self.journal
                .push(Operation::UpdateRecord(record.record_name().to_owned()));
        } else {
            self.journal
                .push(Operation::CreateRecord(record.record_name().to_owned()));
        }
        records.insert(record.record_name().to_owned(), record.clone());
        Ok(())
    }

    fn delete_record(&mut self, zone: &Zone, record: &Record) -> Result<()> {
        self.check_failure(FailOn::Record(record.record_name().to_owned()))?;

        let Some(records) = self.records.get_mut(&zone.name) else {
            return ConflictSnafu {
                message: format!("zone {} doesn't exist", zone.name),
            }
            .fail();
        };
        if records.remove(record.record_name()).is_some() {
            self.journal
                .push(Operation::DeleteRecord(record.record_name().to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    fn zone() -> Zone {
        Zone {
            name: "test".into(),
            dns_name: "example.com.".into(),
            nameservers: vec!["ns1.hoster.com".into()],
            description: String::new(),
        }
    }

    #[test]
    fn create_existing_zone_conflicts() {
        let mut svc = MemoryService::new();
        svc.write_zone(&zone(), true).unwrap();

        let err = svc.write_zone(&zone(), true).unwrap_err();
        assert!(matches!(err, Error::ConflictError { .. }));
        assert_eq!(svc.journal(), &[Operation::CreateZone("test".into())]);
    }

    #[test]
    fn update_missing_zone_conflicts() {
        let mut svc = MemoryService::new();
        let err = svc.write_zone(&zone(), false).unwrap_err();
        assert!(matches!(err, Error::ConflictError { .. }));
        assert!(svc.zone("test").is_none());
    }

    #[test]
    fn zone_update_keeps_records() {
        let record = Record::cname("c.example.com.", 60, "else.com");
        let mut svc = MemoryService::new().with_zone(zone(), vec![record.clone()]);
        let mut changed = zone();
        changed.description = "changed".into();

        svc.write_zone(&changed, false).unwrap();
        assert_eq!(svc.zone("test"), Some(&changed));
        assert_eq!(svc.record("test", "c.example.com."), Some(&record));
    }

    #[test]
    fn delete_absent_zone_is_noop() {
        let mut svc = MemoryService::new();
        svc.delete_zone(&zone()).unwrap();
        assert!(svc.journal().is_empty());
    }

    #[test]
    fn record_existence_rules() {
        let mut svc = MemoryService::new();
        svc.write_zone(&zone(), true).unwrap();
        let record = Record::cname("c.example.com.", 60, "else.com");

        let err = svc.write_record(&zone(), Some(&record), &record).unwrap_err();
        assert!(matches!(err, Error::ConflictError { .. }));

        svc.write_record(&zone(), None, &record).unwrap();
        let err = svc.write_record(&zone(), None, &record).unwrap_err();
        assert!(matches!(err, Error::ConflictError { .. }));

        let updated = Record::cname("c.example.com.", 60, "other.com");
        svc.write_record(&zone(), Some(&record), &updated).unwrap();
        assert_eq!(svc.record("test", "c.example.com."), Some(&updated));
    }

    #[test]
    fn delete_record_is_idempotent() {
        let record = Record::cname("c.example.com.", 60, "else.com");
        let mut svc = MemoryService::new().with_zone(zone(), vec![record.clone()]);

        svc.delete_record(&zone(), &record).unwrap();
        svc.delete_record(&zone(), &record).unwrap();
        assert_eq!(
            svc.take_journal(),
            vec![Operation::DeleteRecord("c.example.com.".into())]
        );
        assert!(svc.journal().is_empty());
    }

    #[test]
    fn injected_failures_surface() {
        let mut svc = MemoryService::new();
        svc.fail_on(FailOn::ListZones);
        assert!(matches!(svc.list_zones(), Err(Error::ResponseError { .. })));

        svc.clear_failures();
        assert!(svc.list_zones().unwrap().is_empty());
    }

    #[test]
    fn injected_zone_failures_leave_state_alone() {
        let mut svc = MemoryService::new().with_zone(zone(), Vec::new());
        svc.fail_on(FailOn::WriteZone);
        svc.fail_on(FailOn::DeleteZone);

        let mut changed = zone();
        changed.description = "changed".into();
        assert!(matches!(
            svc.write_zone(&changed, false),
            Err(Error::ResponseError { .. })
        ));
        assert!(matches!(
            svc.delete_zone(&zone()),
            Err(Error::ResponseError { .. })
        ));
        assert_eq!(svc.zone("test"), Some(&zone()));
        assert!(svc.journal().is_empty());
    }
}
