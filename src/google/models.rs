use crate::common::{Paginated, Record, RecordKind, Zone};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ManagedZonesResponse {
    #[serde(default)]
    pub managed_zones: Vec<ManagedZone>,
    pub next_page_token: Option<String>,
}

impl Paginated for ManagedZonesResponse {
    type Item = ManagedZone;

    fn into_page(self) -> (Vec<ManagedZone>, Option<String>) {
        (self.managed_zones, self.next_page_token)
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RRSetsResponse {
    #[serde(default)]
    pub rrsets: Vec<ResourceRecordSet>,
    pub next_page_token: Option<String>,
}

impl Paginated for RRSetsResponse {
    type Item = ResourceRecordSet;

    fn into_page(self) -> (Vec<ResourceRecordSet>, Option<String>) {
        (self.rrsets, self.next_page_token)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ManagedZone {
    pub name: String,
    pub dns_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_servers: Vec<String>,
    /// Everything else the API returns (DNSSEC, visibility, labels, ...),
    /// sent back untouched on update.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ManagedZone {
    /// Overwrites the fields a [`Zone`] declares. An empty nameserver list
    /// keeps the ones Google assigned.
    pub fn apply(&mut self, zone: &Zone) {
        self.name = zone.name.clone();
        self.dns_name = zone.dns_name.clone();
        self.description = zone.description.clone();
        if !zone.nameservers.is_empty() {
            self.name_servers = zone.nameservers.clone();
        }
    }
}

impl From<ManagedZone> for Zone {
    fn from(value: ManagedZone) -> Self {
        Self {
            name: value.name,
            dns_name: value.dns_name,
            nameservers: value.name_servers,
            description: value.description,
        }
    }
}

impl From<&Zone> for ManagedZone {
    fn from(value: &Zone) -> Self {
        Self {
            name: value.name.clone(),
            dns_name: value.dns_name.clone(),
            description: value.description.clone(),
            name_servers: value.nameservers.clone(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub(super) struct ResourceRecordSet {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ttl: i64,
    #[serde(default)]
    pub rrdatas: Vec<String>,
}

impl From<&Record> for ResourceRecordSet {
    fn from(value: &Record) -> Self {
        Self {
            name: value.record_name().to_owned(),
            kind: value.record_type().to_string(),
            ttl: value.time_to_live(),
            rrdatas: value.rr_data(),
        }
    }
}

impl TryFrom<ResourceRecordSet> for Record {
    type Error = String;

    fn try_from(value: ResourceRecordSet) -> Result<Self, Self::Error> {
        let kind: RecordKind = value.kind.parse()?;
        Ok(match kind {
            RecordKind::A => Record::a(value.name, value.ttl, value.rrdatas),
            RecordKind::CName => {
                let Some(canonical_name) = value.rrdatas.into_iter().next() else {
                    return Err(format!("CNAME record {} has no data", value.name));
                };
                Record::cname(value.name, value.ttl, canonical_name)
            }
            RecordKind::NS => Record::ns(value.name, value.ttl, value.rrdatas),
        })
    }
}

#[derive(Debug, Default, serde::Serialize)]
pub(super) struct Change {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additions: Vec<ResourceRecordSet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deletions: Vec<ResourceRecordSet>,
}
