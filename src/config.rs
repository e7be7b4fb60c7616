use std::path::Path;

use serde::de::{self, Deserialize, Deserializer};
use snafu::ResultExt;

use crate::common::{LoadSnafu, Record, RecordData, RecordKind, Result, Zone};

/// Declared state: one zone and the records it should hold.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    pub zone: Zone,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Config {
    /// Reads a JSON (`.json`) or YAML (anything else) document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .boxed_local()
            .context(LoadSnafu {
                path: path.display().to_string(),
            })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json(&data)
        } else {
            Self::from_yaml(&data)
        }
        .context(LoadSnafu {
            path: path.display().to_string(),
        })?;

        tracing::debug!(
            path = %path.display(),
            zone = config.zone.name,
            records = config.records.len(),
            "Loaded config"
        );
        Ok(config)
    }

    pub fn from_json(data: &str) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_yaml(data: &str) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        Ok(serde_yaml::from_str(data)?)
    }
}

#[derive(serde::Deserialize)]
struct AddressRecord {
    name: String,
    ttl: i64,
    #[serde(default)]
    addresses: Vec<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CNameRecord {
    name: String,
    ttl: i64,
    canonical_name: String,
}

#[derive(serde::Deserialize)]
struct NSRecord {
    name: String,
    ttl: i64,
    #[serde(default)]
    nameservers: Vec<String>,
}

// The kind decides the shape, so it has to be read before the rest.
impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = value
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| de::Error::missing_field("kind"))?;
        let kind: RecordKind = kind.parse().map_err(de::Error::custom)?;

        let record = match kind {
            RecordKind::A => {
                let r = AddressRecord::deserialize(value).map_err(de::Error::custom)?;
                Record {
                    name: r.name,
                    ttl: r.ttl,
                    data: RecordData::A {
                        addresses: r.addresses,
                    },
                }
            }
            RecordKind::CName => {
                let r = CNameRecord::deserialize(value).map_err(de::Error::custom)?;
                Record {
                    name: r.name,
                    ttl: r.ttl,
                    data: RecordData::CName {
                        canonical_name: r.canonical_name,
                    },
                }
            }
            RecordKind::NS => {
                let r = NSRecord::deserialize(value).map_err(de::Error::custom)?;
                Record {
                    name: r.name,
                    ttl: r.ttl,
                    data: RecordData::NS {
                        nameservers: r.nameservers,
                    },
                }
            }
        };
        Ok(record)
    }
}
