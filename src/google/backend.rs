use snafu::prelude::*;

use crate::common::{
    key_file_or_string, ApiClient, ConfigSnafu, Method, Record, Result, Service, Zone,
};

use super::models::{Change, ManagedZone, ManagedZonesResponse, RRSetsResponse, ResourceRecordSet};

pub const BACKEND_NAME: &str = "GoogleCloudDNS";

/// Google Cloud DNS v1 over its REST API.
pub struct GoogleCloudDns {
    client: ApiClient,
    project: String,
    base_url: url::Url,
}

fn next_page(url: &url::Url, token: &str) -> Result<url::Url> {
    let mut url = url.clone();
    url.query_pairs_mut().append_pair("pageToken", token);
    Ok(url)
}

impl GoogleCloudDns {
    fn url(&self, segments: &[&str]) -> Result<url::Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ConfigSnafu {
                    message: format!("{} cannot be used as a base URL", self.base_url),
                    prefix: BACKEND_NAME,
                }
                .build()
            })?
            .pop_if_empty()
            .extend(["projects", self.project.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn changes_url(&self, zone: &Zone) -> Result<url::Url> {
        self.url(&["managedZones", &zone.name, "changes"])
    }
}

impl Service for GoogleCloudDns {
    fn list_zones(&mut self) -> Result<Vec<Zone>> {
        let url = self.url(&["managedZones"])?;
        let zones = self
            .client
            .get_paginated::<ManagedZonesResponse, _>(&url, next_page)?;
        tracing::info!(
            backend = BACKEND_NAME,
            zones = zones.len(),
            "Read completed"
        );
        Ok(zones.into_iter().map(Zone::from).collect())
    }

    fn write_zone(&mut self, zone: &Zone, create: bool) -> Result<()> {
        if create {
            let url = self.url(&["managedZones"])?;
            return self
                .client
                .write(Method::Create, &url, &[], ManagedZone::from(zone));
        }

        let url = self.url(&["managedZones", &zone.name])?;
        let mut current: ManagedZone = self.client.get(&url)?;
        current.apply(zone);
        self.client.write(Method::Update, &url, &[], current)
    }

    fn delete_zone(&mut self, zone: &Zone) -> Result<()> {
        let url = self.url(&["managedZones", &zone.name])?;
        self.client.remove(Method::Delete, &url, None)
    }

    fn list_records(&mut self, zone: &Zone) -> Result<Vec<Record>> {
        let url = self.url(&["managedZones", &zone.name, "rrsets"])?;
        let sets = self
            .client
            .get_paginated::<RRSetsResponse, _>(&url, next_page)?;

        let mut records = Vec::with_capacity(sets.len());
        for set in sets {
            let name = set.name.clone();
            match Record::try_from(set) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    tracing::debug!(backend = BACKEND_NAME, name, reason, "Skipping record")
                }
            }
        }

        tracing::info!(
            backend = BACKEND_NAME,
            zone = zone.name,
            records = records.len(),
            "Read completed",
        );
        Ok(records)
    }

    fn write_record(&mut self, zone: &Zone, old: Option<&Record>, record: &Record) -> Result<()> {
        let change = Change {
            additions: vec![ResourceRecordSet::from(record)],
            deletions: old.map(ResourceRecordSet::from).into_iter().collect(),
        };
        self.client
            .write(Method::Create, &self.changes_url(zone)?, &[], change)
    }

    fn delete_record(&mut self, zone: &Zone, record: &Record) -> Result<()> {
        let change = Change {
            deletions: vec![ResourceRecordSet::from(record)],
            ..Default::default()
        };
        let body = self.client.to_body(change)?;
        self.client
            .remove(Method::Create, &self.changes_url(zone)?, Some(body))
    }
}

impl TryFrom<super::Config> for GoogleCloudDns {
    type Error = crate::common::Error;

    fn try_from(value: super::Config) -> Result<Self> {
        ensure!(
            !value.project.is_empty(),
            ConfigSnafu {
                message: "project is required",
                prefix: BACKEND_NAME,
            }
        );
        ensure!(
            !value.base_url.cannot_be_a_base(),
            ConfigSnafu {
                message: format!("{} cannot be used as a base URL", value.base_url),
                prefix: BACKEND_NAME,
            }
        );
        let access_token = key_file_or_string(value.access_token, BACKEND_NAME.into())?;

        Ok(Self {
            client: ApiClient::new(BACKEND_NAME, access_token, value.timeout_secs),
            project: value.project,
            base_url: value.base_url,
        })
    }
}
