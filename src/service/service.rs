use uuid::Uuid;

use crate::common::{find_record, record_is_different, zones_equal, Record, Result, Service, Zone};

use super::{Change, Observer, SyncReport};

/// Converges a provider's zone and record set onto a declared state.
///
/// Calls are issued one at a time. The first failing call aborts the run
/// and is returned as is; changes already applied are kept, so running
/// again picks up where the failed run stopped.
pub struct DNSSync<S: Service> {
    service: S,
    observer: Option<Box<dyn Observer>>,
    dry_run: bool,
}

impl<S: Service> DNSSync<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            observer: None,
            dry_run: false,
        }
    }

    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Plan changes without issuing any write.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn into_service(self) -> S {
        self.service
    }

    pub fn sync(&mut self, zone: &Zone, records: &[Record]) -> Result<SyncReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("sync", %run_id, zone = zone.name, dry_run = self.dry_run);
        let _guard = span.enter();

        let mut report = SyncReport::default();

        tracing::info!("Syncing zones");
        let zone_exists = self.reconcile_zone(zone, &mut report)?;

        tracing::info!("Syncing records");
        if zone_exists {
            self.reconcile_records(zone, records, &mut report)?;
        } else {
            // Dry run of a zone which would be created: nothing to list yet.
            self.plan_records(zone, records, Vec::new(), &mut report)?;
        }

        if report.is_empty() {
            tracing::info!("No changes detected");
        } else {
            tracing::info!(
                zones_created = report.zones_created,
                zones_updated = report.zones_updated,
                records_created = report.records_created,
                records_updated = report.records_updated,
                records_deleted = report.records_deleted,
                "{}",
                if self.dry_run {
                    "Dry run completed"
                } else {
                    "Sync completed"
                },
            );
        }
        Ok(report)
    }

    /// Creates the zone if no zone of the same name exists, or rewrites it
    /// if any field differs.
    pub fn sync_zone(&mut self, zone: &Zone) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        self.reconcile_zone(zone, &mut report)?;
        Ok(report)
    }

    /// Creates, updates and deletes records until the zone holds exactly
    /// `records`, plus its apex record. The zone must already exist.
    pub fn sync_records(&mut self, zone: &Zone, records: &[Record]) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        self.reconcile_records(zone, records, &mut report)?;
        Ok(report)
    }

    /// Returns whether the zone exists at the provider afterwards, which is
    /// only false on a dry run.
    fn reconcile_zone(&mut self, zone: &Zone, report: &mut SyncReport) -> Result<bool> {
        let current = self.service.list_zones()?;
        tracing::debug!(zones = current.len(), "Listed zones");

        let mut matching = current.iter().filter(|z| z.name == zone.name);
        let existing = matching.next();
        let duplicates = matching.count();
        if duplicates > 0 {
            tracing::warn!(
                zone = zone.name,
                duplicates,
                "Provider lists several zones with this name, using the first"
            );
        }

        match existing {
            None => {
                tracing::info!(zone = zone.name, dns_name = zone.dns_name, "Creating zone");
                if !self.dry_run {
                    self.service.write_zone(zone, true)?;
                }
                self.record_change(Change::ZoneCreated(zone.clone()), report);
                Ok(!self.dry_run)
            }
            Some(existing) if !zones_equal(zone, existing) => {
                tracing::info!(zone = zone.name, dns_name = zone.dns_name, "Updating zone");
                if !self.dry_run {
                    self.service.write_zone(zone, false)?;
                }
                self.record_change(Change::ZoneUpdated(zone.clone()), report);
                Ok(true)
            }
            Some(_) => {
                tracing::debug!(zone = zone.name, "Zone is up to date");
                Ok(true)
            }
        }
    }

    fn reconcile_records(
        &mut self,
        zone: &Zone,
        records: &[Record],
        report: &mut SyncReport,
    ) -> Result<()> {
        let current = self.service.list_records(zone)?;
        tracing::debug!(zone = zone.name, records = current.len(), "Listed records");
        self.plan_records(zone, records, current, report)
    }

    fn plan_records(
        &mut self,
        zone: &Zone,
        records: &[Record],
        current: Vec<Record>,
        report: &mut SyncReport,
    ) -> Result<()> {
        for record in records {
            match find_record(record.record_name(), &current) {
                Some(existing) if record_is_different(record, existing) => {
                    tracing::info!(
                        record = record.record_name(),
                        kind = %record.record_type(),
                        "Updating record"
                    );
                    if !self.dry_run {
                        self.service.write_record(zone, Some(existing), record)?;
                    }
                    self.record_change(
                        Change::RecordUpdated {
                            old: existing.clone(),
                            new: record.clone(),
                        },
                        report,
                    );
                }
                Some(_) => {}
                None => {
                    tracing::info!(
                        record = record.record_name(),
                        kind = %record.record_type(),
                        "Creating record"
                    );
                    if !self.dry_run {
                        self.service.write_record(zone, None, record)?;
                    }
                    self.record_change(Change::RecordCreated(record.clone()), report);
                }
            }
        }

        for record in current {
            // The apex record is managed by the provider and must survive.
            if record.record_name() == zone.dns_name {
                continue;
            }
            if find_record(record.record_name(), records).is_none() {
                tracing::info!(
                    record = record.record_name(),
                    kind = %record.record_type(),
                    "Deleting record"
                );
                if !self.dry_run {
                    self.service.delete_record(zone, &record)?;
                }
                self.record_change(Change::RecordDeleted(record), report);
            }
        }

        Ok(())
    }

    fn record_change(&self, change: Change, report: &mut SyncReport) {
        report.count(&change);
        if let Some(observer) = &self.observer {
            observer.notify(&change);
        }
    }
}
