use std::fmt;
use std::str::FromStr;

pub const RECORD_KIND_A: &str = "A";
pub const RECORD_KIND_CNAME: &str = "CNAME";
pub const RECORD_KIND_NS: &str = "NS";

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub name: String,
    pub dns_name: String,
    #[serde(default)]
    pub nameservers: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    A,
    CName,
    NS,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::A => RECORD_KIND_A,
            RecordKind::CName => RECORD_KIND_CNAME,
            RecordKind::NS => RECORD_KIND_NS,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            RECORD_KIND_A => Ok(RecordKind::A),
            RECORD_KIND_CNAME => Ok(RecordKind::CName),
            RECORD_KIND_NS => Ok(RecordKind::NS),
            other => Err(format!("Unknown record type: {other}")),
        }
    }
}

/// Kind-specific payload of a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind")]
pub enum RecordData {
    #[serde(rename = "A")]
    A { addresses: Vec<String> },
    #[serde(rename = "CNAME", rename_all = "camelCase")]
    CName { canonical_name: String },
    #[serde(rename = "NS")]
    NS { nameservers: Vec<String> },
}

/// A single named record set within a zone.
///
/// Records are values: an update replaces the whole record through
/// [`Service::write_record`] rather than mutating fields.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Record {
    pub name: String,
    pub ttl: i64,
    #[serde(flatten)]
    pub data: RecordData,
}

impl Record {
    pub fn a(name: impl Into<String>, ttl: i64, addresses: Vec<String>) -> Self {
        Self {
            name: name.into(),
            ttl,
            data: RecordData::A { addresses },
        }
    }

    pub fn cname(name: impl Into<String>, ttl: i64, canonical_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl,
            data: RecordData::CName {
                canonical_name: canonical_name.into(),
            },
        }
    }

    pub fn ns(name: impl Into<String>, ttl: i64, nameservers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            ttl,
            data: RecordData::NS { nameservers },
        }
    }

    pub fn record_type(&self) -> RecordKind {
        match self.data {
            RecordData::A { .. } => RecordKind::A,
            RecordData::CName { .. } => RecordKind::CName,
            RecordData::NS { .. } => RecordKind::NS,
        }
    }

    pub fn record_name(&self) -> &str {
        &self.name
    }

    pub fn time_to_live(&self) -> i64 {
        self.ttl
    }

    /// The payload as an ordered list of strings, whatever the kind.
    pub fn rr_data(&self) -> Vec<String> {
        match &self.data {
            RecordData::A { addresses } => addresses.clone(),
            RecordData::CName { canonical_name } => vec![canonical_name.clone()],
            RecordData::NS { nameservers } => nameservers.clone(),
        }
    }
}

/// Operations any DNS backend must offer for a zone to be synchronised.
pub trait Service {
    fn list_zones(&mut self) -> super::Result<Vec<Zone>>;
    /// Creates the zone when `create` is set, otherwise replaces the
    /// existing zone of the same name.
    fn write_zone(&mut self, zone: &Zone, create: bool) -> super::Result<()>;
    fn delete_zone(&mut self, zone: &Zone) -> super::Result<()>;

    fn list_records(&mut self, zone: &Zone) -> super::Result<Vec<Record>>;
    /// Creates `record` when `old` is `None`, otherwise replaces `old`.
    fn write_record(&mut self, zone: &Zone, old: Option<&Record>, record: &Record)
        -> super::Result<()>;
    fn delete_record(&mut self, zone: &Zone, record: &Record) -> super::Result<()>;
}

impl<S: Service + ?Sized> Service for Box<S> {
    fn list_zones(&mut self) -> super::Result<Vec<Zone>> {
        (**self).list_zones()
    }

    fn write_zone(&mut self, zone: &Zone, create: bool) -> super::Result<()> {
        (**self).write_zone(zone, create)
    }

    fn delete_zone(&mut self, zone: &Zone) -> super::Result<()> {
        (**self).delete_zone(zone)
    }

    fn list_records(&mut self, zone: &Zone) -> super::Result<Vec<Record>> {
        (**self).list_records(zone)
    }

    fn write_record(
        &mut self,
        zone: &Zone,
        old: Option<&Record>,
        record: &Record,
    ) -> super::Result<()> {
        (**self).write_record(zone, old, record)
    }

    fn delete_record(&mut self, zone: &Zone, record: &Record) -> super::Result<()> {
        (**self).delete_record(zone, record)
    }
}
