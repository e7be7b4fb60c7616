//! End to end reconciliation against the in-memory service.

mod common;

use common::*;
use dns_zone_sync::common::{Error, Record, Result, Service, Zone};
use dns_zone_sync::memory::{FailOn, MemoryService, Operation};
use dns_zone_sync::service::{Change, DNSSync, SyncReport};

fn synced() -> DNSSync<MemoryService> {
    let mut sync = DNSSync::new(MemoryService::new());
    sync.sync(&zone(), &records()).expect("initial sync succeeds");
    sync.service_mut().take_journal();
    sync
}

#[test]
fn creates_zone_and_records_from_empty_state() {
    let mut sync = DNSSync::new(MemoryService::new());

    let report = sync.sync(&zone(), &records()).unwrap();

    assert_eq!(
        report,
        SyncReport {
            zones_created: 1,
            records_created: 3,
            ..Default::default()
        }
    );
    let svc = sync.service_mut();
    assert_eq!(svc.zone("test"), Some(&zone()));
    assert_eq!(
        svc.journal(),
        &[
            Operation::CreateZone("test".into()),
            Operation::CreateRecord("example.com.".into()),
            Operation::CreateRecord("cname.example.com.".into()),
            Operation::CreateRecord("www.example.com.".into()),
        ]
    );
    let out = svc.list_records(&zone()).unwrap();
    assert_record_sets_equal(&records(), &out);
}

#[test]
fn second_run_is_a_noop() {
    let mut sync = synced();

    let report = sync.sync(&zone(), &records()).unwrap();

    assert!(report.is_empty(), "{report:?}");
    assert!(sync.service().journal().is_empty());
}

#[test]
fn changed_nameservers_update_zone_in_place() {
    let mut existing = zone();
    existing.nameservers = vec!["ns1.other.com".into(), "ns2.other.com".into()];
    let mut sync = DNSSync::new(MemoryService::new().with_zone(existing, Vec::new()));

    let report = sync.sync_zone(&zone()).unwrap();

    assert_eq!(report.zones_updated, 1);
    assert_eq!(report.len(), 1);
    assert_eq!(
        sync.service().journal(),
        &[Operation::UpdateZone("test".into())]
    );
    assert_eq!(sync.service().zone("test"), Some(&zone()));
}

#[test]
fn reordered_zone_nameservers_count_as_change() {
    let mut existing = zone();
    existing.nameservers.reverse();
    let mut sync = DNSSync::new(MemoryService::new().with_zone(existing, Vec::new()));

    assert_eq!(sync.sync_zone(&zone()).unwrap().zones_updated, 1);
    assert!(sync.sync_zone(&zone()).unwrap().is_empty());
}

#[test]
fn changed_cname_target_is_a_single_update() {
    let mut sync = synced();
    let mut desired = records();
    desired[1] = Record::cname("cname.example.com.", 725, "alternative.else.com");

    let report = sync.sync(&zone(), &desired).unwrap();

    assert_eq!(report.records_updated, 1);
    assert_eq!(report.len(), 1);
    assert_eq!(
        sync.service().journal(),
        &[Operation::UpdateRecord("cname.example.com.".into())]
    );
    assert_eq!(
        sync.service().record("test", "cname.example.com."),
        Some(&desired[1])
    );
}

#[test]
fn dropped_record_is_deleted_alone() {
    let mut sync = synced();
    let desired = vec![records()[0].clone(), records()[2].clone()];

    let report = sync.sync(&zone(), &desired).unwrap();

    assert_eq!(report.records_deleted, 1);
    assert_eq!(report.len(), 1);
    assert_eq!(
        sync.service().journal(),
        &[Operation::DeleteRecord("cname.example.com.".into())]
    );
    let out = sync.service_mut().list_records(&zone()).unwrap();
    assert_record_sets_equal(&desired, &out);
}

#[test]
fn apex_record_is_never_deleted() {
    let apex = Record::ns(
        "example.com.",
        21600,
        vec!["ns-cloud-a1.googledomains.com.".into()],
    );
    let stale = Record::cname("old.example.com.", 60, "gone.example.com.");
    let svc = MemoryService::new().with_zone(zone(), vec![apex.clone(), stale]);
    let mut sync = DNSSync::new(svc);
    let desired = vec![Record::cname("cname.example.com.", 125, "somewhere.else.com")];

    sync.sync(&zone(), &desired).unwrap();

    let svc = sync.service();
    assert_eq!(svc.record("test", "example.com."), Some(&apex));
    assert!(svc.record("test", "old.example.com.").is_none());
    assert!(!svc
        .journal()
        .contains(&Operation::DeleteRecord("example.com.".into())));
}

#[test]
fn reordered_addresses_trigger_update() {
    let mut sync = synced();
    let mut desired = records();
    desired[0] = Record::a("example.com.", 25, vec!["2.3.4.5".into(), "1.2.3.4".into()]);

    let report = sync.sync(&zone(), &desired).unwrap();

    assert_eq!(report.records_updated, 1);
    assert_eq!(
        sync.service().journal(),
        &[Operation::UpdateRecord("example.com.".into())]
    );
}

#[test]
fn changed_kind_replaces_record() {
    let mut sync = synced();
    let mut desired = records();
    desired[1] = Record::a("cname.example.com.", 125, vec!["9.9.9.9".into()]);

    sync.sync(&zone(), &desired).unwrap();

    assert_eq!(
        sync.service().record("test", "cname.example.com."),
        Some(&desired[1])
    );
}

#[test]
fn converges_onto_desired_set() {
    let stale = vec![
        Record::cname("old.example.com.", 60, "gone.example.com."),
        Record::cname("cname.example.com.", 60, "stale.example.com."),
    ];
    let mut existing = zone();
    existing.description = "outdated".into();
    let mut sync = DNSSync::new(MemoryService::new().with_zone(existing, stale));

    sync.sync(&zone(), &records()).unwrap();

    let svc = sync.service_mut();
    let zones = svc.list_zones().unwrap();
    assert!(zones.contains(&zone()));
    let out = svc.list_records(&zone()).unwrap();
    assert_record_sets_equal(&records(), &out);
}

#[test]
fn first_failure_aborts_and_rerun_converges() {
    let mut sync = DNSSync::new(MemoryService::new());
    sync.service_mut()
        .fail_on(FailOn::Record("cname.example.com.".into()));

    let err = sync.sync(&zone(), &records()).unwrap_err();
    assert!(matches!(err, Error::ResponseError { .. }), "{err}");
    assert_eq!(
        sync.service_mut().take_journal(),
        vec![
            Operation::CreateZone("test".into()),
            Operation::CreateRecord("example.com.".into()),
        ]
    );

    sync.service_mut().clear_failures();
    let report = sync.sync(&zone(), &records()).unwrap();
    assert_eq!(report.records_created, 2);
    assert_eq!(report.zones_created, 0);
    let out = sync.service_mut().list_records(&zone()).unwrap();
    assert_record_sets_equal(&records(), &out);
}

#[test]
fn zone_write_failure_stops_before_records() {
    let mut existing = zone();
    existing.description = "outdated".into();
    let stale = Record::cname("old.example.com.", 60, "gone.example.com.");
    let mut svc = MemoryService::new().with_zone(existing.clone(), vec![stale.clone()]);
    svc.fail_on(FailOn::WriteZone);
    let mut sync = DNSSync::new(svc);

    let err = sync.sync(&zone(), &records()).unwrap_err();

    assert!(matches!(err, Error::ResponseError { .. }), "{err}");
    assert!(sync.service().journal().is_empty());
    assert_eq!(sync.service().zone("test"), Some(&existing));
    assert_eq!(
        sync.service().record("test", "old.example.com."),
        Some(&stale)
    );

    sync.service_mut().clear_failures();
    let report = sync.sync(&zone(), &records()).unwrap();
    assert_eq!(report.zones_updated, 1);
    assert_eq!(report.records_created, 3);
    assert_eq!(report.records_deleted, 1);
}

#[test]
fn zone_create_failure_is_returned() {
    let mut svc = MemoryService::new();
    svc.fail_on(FailOn::WriteZone);
    let mut sync = DNSSync::new(svc);

    assert!(sync.sync(&zone(), &records()).is_err());
    assert!(sync.service().zone("test").is_none());
    assert!(sync.service().journal().is_empty());
}

#[test]
fn listing_failure_prevents_any_write() {
    let mut svc = MemoryService::new();
    svc.fail_on(FailOn::ListZones);
    let mut sync = DNSSync::new(svc);

    assert!(sync.sync(&zone(), &records()).is_err());
    assert!(sync.service().journal().is_empty());
}

#[test]
fn record_sync_requires_listing() {
    let mut sync = synced();
    sync.service_mut().fail_on(FailOn::ListRecords);

    assert!(sync.sync_records(&zone(), &[]).is_err());
    assert!(sync.service().journal().is_empty());
}

#[test]
fn dry_run_plans_without_writing() {
    let mut sync = DNSSync::new(MemoryService::new()).dry_run(true);

    let report = sync.sync(&zone(), &records()).unwrap();

    assert_eq!(report.zones_created, 1);
    assert_eq!(report.records_created, 3);
    assert!(sync.service().journal().is_empty());
    assert!(sync.service().zone("test").is_none());
}

#[test]
fn dry_run_against_existing_zone() {
    let svc = synced().into_service();
    let mut sync = DNSSync::new(svc).dry_run(true);

    let report = sync.sync(&zone(), &records()[..1]).unwrap();

    assert_eq!(report.records_deleted, 2);
    assert!(sync.service().journal().is_empty());
    assert!(sync.service().record("test", "cname.example.com.").is_some());
}

#[test]
fn observer_sees_changes_in_order() {
    let recorder = Recorder::default();
    let mut sync = DNSSync::new(MemoryService::new()).with_observer(recorder.clone());

    sync.sync(&zone(), &records()[1..2]).unwrap();

    assert_eq!(
        recorder.changes(),
        vec![
            Change::ZoneCreated(zone()),
            Change::RecordCreated(records()[1].clone()),
        ]
    );
}

#[test]
fn closures_can_observe() {
    let count = std::rc::Rc::new(std::cell::Cell::new(0));
    let seen = count.clone();
    let mut sync = DNSSync::new(MemoryService::new())
        .with_observer(move |_: &Change| seen.set(seen.get() + 1));

    sync.sync(&zone(), &records()).unwrap();

    assert_eq!(count.get(), 4);
}

/// Lists the wrapped zone twice, as a misbehaving provider might.
struct DuplicateZones(MemoryService);

impl Service for DuplicateZones {
    fn list_zones(&mut self) -> Result<Vec<Zone>> {
        let mut zones = self.0.list_zones()?;
        let mut other = zones[0].clone();
        other.description = "duplicate".into();
        zones.push(other);
        Ok(zones)
    }

    fn write_zone(&mut self, zone: &Zone, create: bool) -> Result<()> {
        self.0.write_zone(zone, create)
    }

    fn delete_zone(&mut self, zone: &Zone) -> Result<()> {
        self.0.delete_zone(zone)
    }

    fn list_records(&mut self, zone: &Zone) -> Result<Vec<Record>> {
        self.0.list_records(zone)
    }

    fn write_record(&mut self, zone: &Zone, old: Option<&Record>, record: &Record) -> Result<()> {
        self.0.write_record(zone, old, record)
    }

    fn delete_record(&mut self, zone: &Zone, record: &Record) -> Result<()> {
        self.0.delete_record(zone, record)
    }
}

#[test]
fn duplicate_zone_names_use_first_listed() {
    let svc = DuplicateZones(MemoryService::new().with_zone(zone(), Vec::new()));
    let mut sync = DNSSync::new(svc);

    let report = sync.sync_zone(&zone()).unwrap();

    assert!(report.is_empty());
    assert!(sync.service().0.journal().is_empty());
}
