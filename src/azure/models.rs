use std::collections::BTreeMap;

use crate::common::{Paginated, Record, RecordData, RecordKind, Zone};

pub(super) const API_VERSION: &str = "2018-05-01";
pub(super) const ZONE_LOCATION: &str = "global";

const TAG_NAME: &str = "name";
const TAG_DESCRIPTION: &str = "description";
const APEX: &str = "@";

#[derive(serde::Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub(super) struct ListResponse<T> {
    #[serde(default)]
    pub value: Vec<T>,
    #[serde(rename = "nextLink")]
    pub next_link: Option<String>,
}

impl<T> Paginated for ListResponse<T> {
    type Item = T;

    fn into_page(self) -> (Vec<T>, Option<String>) {
        (self.value, self.next_link)
    }
}

/// Azure keys zones by DNS name, so the logical name and description
/// live in tags.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub(super) struct DnsZone {
    #[serde(default, skip_serializing)]
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub properties: ZoneProperties,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ZoneProperties {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_servers: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DnsZone {
    pub fn apply(&mut self, zone: &Zone) {
        self.name = resource_name(&zone.dns_name).to_owned();
        self.tags.insert(TAG_NAME.into(), zone.name.clone());
        self.tags.insert(TAG_DESCRIPTION.into(), zone.description.clone());
        if !zone.nameservers.is_empty() {
            self.properties.name_servers = zone.nameservers.clone();
        }
    }
}

impl From<&Zone> for DnsZone {
    fn from(value: &Zone) -> Self {
        let mut zone = Self {
            name: String::new(),
            location: ZONE_LOCATION.into(),
            tags: BTreeMap::new(),
            properties: ZoneProperties::default(),
            extra: serde_json::Map::new(),
        };
        zone.apply(value);
        zone
    }
}

impl From<DnsZone> for Zone {
    fn from(mut value: DnsZone) -> Self {
        Self {
            name: value.tags.remove(TAG_NAME).unwrap_or_default(),
            dns_name: format!("{}.", resource_name(&value.name)),
            nameservers: value.properties.name_servers,
            description: value.tags.remove(TAG_DESCRIPTION).unwrap_or_default(),
        }
    }
}

/// Zone resource name: the DNS name without its trailing dot.
pub(super) fn resource_name(dns_name: &str) -> &str {
    dns_name.strip_suffix('.').unwrap_or(dns_name)
}

/// Record set name relative to the zone, `@` for the apex.
pub(super) fn relative_name<'a>(record_name: &'a str, zone: &Zone) -> &'a str {
    let record_name = resource_name(record_name);
    let zone_name = resource_name(&zone.dns_name);
    if record_name == zone_name {
        return APEX;
    }
    record_name
        .strip_suffix(zone_name)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .unwrap_or(record_name)
}

fn absolute_name(relative: &str, zone: &Zone) -> String {
    if relative == APEX {
        zone.dns_name.clone()
    } else {
        format!("{relative}.{}", zone.dns_name)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub(super) struct RecordSet {
    #[serde(default, skip_serializing)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing)]
    pub kind: String,
    pub properties: RecordSetProperties,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub(super) struct RecordSetProperties {
    #[serde(rename = "TTL")]
    pub ttl: i64,
    #[serde(rename = "ARecords", default, skip_serializing_if = "Vec::is_empty")]
    pub a_records: Vec<ARecord>,
    #[serde(rename = "CNAMERecord", default, skip_serializing_if = "Option::is_none")]
    pub cname_record: Option<CNameRecord>,
    #[serde(rename = "NSRecords", default, skip_serializing_if = "Vec::is_empty")]
    pub ns_records: Vec<NSRecord>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub(super) struct ARecord {
    #[serde(rename = "ipv4Address")]
    pub ipv4_address: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub(super) struct CNameRecord {
    pub cname: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub(super) struct NSRecord {
    pub nsdname: String,
}

impl RecordSet {
    /// Converts a listed record set, whose type looks like
    /// `Microsoft.Network/dnszones/A`.
    pub fn into_record(self, zone: &Zone) -> Result<Record, String> {
        let kind: RecordKind = self.kind.rsplit('/').next().unwrap_or_default().parse()?;
        let name = absolute_name(&self.name, zone);
        let ttl = self.properties.ttl;
        Ok(match kind {
            RecordKind::A => Record::a(
                name,
                ttl,
                self.properties
                    .a_records
                    .into_iter()
                    .map(|a| a.ipv4_address)
                    .collect(),
            ),
            RecordKind::CName => {
                let Some(cname) = self.properties.cname_record else {
                    return Err(format!("CNAME record {name} has no data"));
                };
                Record::cname(name, ttl, cname.cname)
            }
            RecordKind::NS => Record::ns(
                name,
                ttl,
                self.properties
                    .ns_records
                    .into_iter()
                    .map(|ns| ns.nsdname)
                    .collect(),
            ),
        })
    }
}

impl From<&Record> for RecordSet {
    fn from(value: &Record) -> Self {
        let mut properties = RecordSetProperties {
            ttl: value.time_to_live(),
            ..Default::default()
        };
        match &value.data {
            RecordData::A { addresses } => {
                properties.a_records = addresses
                    .iter()
                    .map(|ip| ARecord {
                        ipv4_address: ip.clone(),
                    })
                    .collect()
            }
            RecordData::CName { canonical_name } => {
                properties.cname_record = Some(CNameRecord {
                    cname: canonical_name.clone(),
                })
            }
            RecordData::NS { nameservers } => {
                properties.ns_records = nameservers
                    .iter()
                    .map(|ns| NSRecord {
                        nsdname: ns.clone(),
                    })
                    .collect()
            }
        }
        Self {
            name: String::new(),
            kind: value.record_type().to_string(),
            properties,
        }
    }
}
