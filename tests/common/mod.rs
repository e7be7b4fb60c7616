#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dns_zone_sync::common::{Record, Zone};
use dns_zone_sync::service::{Change, Observer};

pub fn zone() -> Zone {
    Zone {
        name: "test".into(),
        dns_name: "example.com.".into(),
        nameservers: vec!["ns1.hoster.com".into(), "ns2.hoster.com".into()],
        description: String::new(),
    }
}

pub fn records() -> Vec<Record> {
    vec![
        Record::a("example.com.", 25, vec!["1.2.3.4".into(), "2.3.4.5".into()]),
        Record::cname("cname.example.com.", 125, "somewhere.else.com"),
        Record::ns(
            "www.example.com.",
            525,
            vec!["ns1.company.com".into(), "ns2.company.com".into()],
        ),
    ]
}

/// Asserts both lists hold the same records by name, ignoring order.
pub fn assert_record_sets_equal(expected: &[Record], actual: &[Record]) {
    assert_eq!(expected.len(), actual.len(), "{expected:?} vs {actual:?}");
    for record in actual {
        let wanted = expected
            .iter()
            .find(|r| r.record_name() == record.record_name())
            .unwrap_or_else(|| panic!("unexpected record {record:?}"));
        assert_eq!(wanted, record);
    }
}

/// Observer collecting every change it is told about.
#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<Change>>>);

impl Recorder {
    pub fn changes(&self) -> Vec<Change> {
        self.0.borrow().clone()
    }
}

impl Observer for Recorder {
    fn notify(&self, change: &Change) {
        self.0.borrow_mut().push(change.clone());
    }
}
