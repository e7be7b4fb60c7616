use snafu::prelude::*;

use crate::common::{
    key_file_or_string, ApiClient, ConfigSnafu, Method, Record, Result, Service, Zone,
};

use super::models::{relative_name, resource_name, DnsZone, ListResponse, RecordSet, API_VERSION};

pub const BACKEND_NAME: &str = "AzureDNS";

// Preconditions turning a PUT into a strict create or a strict update.
const CREATE_ONLY: (&str, &str) = ("If-None-Match", "*");
const UPDATE_ONLY: (&str, &str) = ("If-Match", "*");

/// Azure DNS zones of one resource group, over the Resource Manager API.
pub struct AzureDns {
    client: ApiClient,
    subscription: String,
    resource_group: String,
    base_url: url::Url,
}

fn next_page(_: &url::Url, link: &str) -> Result<url::Url> {
    url::Url::parse(link).map_err(|err| {
        ConfigSnafu {
            message: format!("Invalid next page link {link}: {err}"),
            prefix: BACKEND_NAME,
        }
        .build()
    })
}

impl AzureDns {
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
            .extend([
                "subscriptions",
                self.subscription.as_str(),
                "resourceGroups",
                self.resource_group.as_str(),
                "providers",
                "Microsoft.Network",
                "dnsZones",
            ])
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    fn record_url(&self, zone: &Zone, record: &Record) -> Result<url::Url> {
        self.url(&[
            resource_name(&zone.dns_name),
            record.record_type().as_str(),
            relative_name(record.record_name(), zone),
        ])
    }
}

impl Service for AzureDns {
    fn list_zones(&mut self) -> Result<Vec<Zone>> {
        let url = self.url(&[])?;
        let zones = self
            .client
            .get_paginated::<ListResponse<DnsZone>, _>(&url, next_page)?;
        tracing::info!(
            backend = BACKEND_NAME,
            zones = zones.len(),
            "Read completed"
        );
        Ok(zones.into_iter().map(Zone::from).collect())
    }

    fn write_zone(&mut self, zone: &Zone, create: bool) -> Result<()> {
        let url = self.url(&[resource_name(&zone.dns_name)])?;
        if create {
            return self
                .client
                .write(Method::Update, &url, &[CREATE_ONLY], DnsZone::from(zone));
        }

        let mut current: DnsZone = self.client.get(&url)?;
        current.apply(zone);
        self.client
            .write(Method::Update, &url, &[UPDATE_ONLY], current)
    }

    fn delete_zone(&mut self, zone: &Zone) -> Result<()> {
        let url = self.url(&[resource_name(&zone.dns_name)])?;
        self.client.remove(Method::Delete, &url, None)
    }

    fn list_records(&mut self, zone: &Zone) -> Result<Vec<Record>> {
        let url = self.url(&[resource_name(&zone.dns_name), "recordsets"])?;
        let sets = self
            .client
            .get_paginated::<ListResponse<RecordSet>, _>(&url, next_page)?;

        let mut records = Vec::with_capacity(sets.len());
        for set in sets {
            let name = set.name.clone();
            match set.into_record(zone) {
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
        let url = self.record_url(zone, record)?;
        let Some(old) = old else {
            return self
                .client
                .write(Method::Update, &url, &[CREATE_ONLY], RecordSet::from(record));
        };

        let old_url = self.record_url(zone, old)?;
        if old_url == url {
            return self
                .client
                .write(Method::Update, &url, &[UPDATE_ONLY], RecordSet::from(record));
        }

        // Record sets are keyed by type, so a kind change is a new set.
        self.client
            .write(Method::Update, &url, &[], RecordSet::from(record))?;
        self.client.remove(Method::Delete, &old_url, None)
    }

    fn delete_record(&mut self, zone: &Zone, record: &Record) -> Result<()> {
        let url = self.record_url(zone, record)?;
        self.client.remove(Method::Delete, &url, None)
    }
}

impl TryFrom<super::Config> for AzureDns {
    type Error = crate::common::Error;

    fn try_from(value: super::Config) -> Result<Self> {
        ensure!(
            !value.subscription.is_empty(),
            ConfigSnafu {
                message: "subscription is required",
                prefix: BACKEND_NAME,
            }
        );
        ensure!(
            !value.resource_group.is_empty(),
            ConfigSnafu {
                message: "resource_group is required",
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
            subscription: value.subscription,
            resource_group: value.resource_group,
            base_url: value.base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    fn config(base_url: &str) -> super::super::Config {
        super::super::Config {
            subscription: "sub-id".into(),
            resource_group: "dns-rg".into(),
            access_token: "token".into(),
            base_url: url::Url::parse(base_url).unwrap(),
            timeout_secs: 5,
        }
    }

    fn zone() -> Zone {
        Zone {
            name: "test".into(),
            dns_name: "example.com.".into(),
            nameservers: Vec::new(),
            description: String::new(),
        }
    }

    #[test]
    fn builds_resource_group_scoped_urls() {
        let dns = AzureDns::try_from(config(super::super::DEFAULT_BASE_URL)).unwrap();
        let url = dns.url(&["example.com", "recordsets"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/subscriptions/sub-id/resourceGroups/dns-rg\
             /providers/Microsoft.Network/dnsZones/example.com/recordsets?api-version=2018-05-01"
        );
    }

    #[test]
    fn record_urls_use_type_and_relative_name() {
        let dns = AzureDns::try_from(config(super::super::DEFAULT_BASE_URL)).unwrap();
        let apex = Record::ns("example.com.", 60, vec!["ns1.company.com".into()]);
        let www = Record::cname("www.example.com.", 60, "else.com");

        let apex_url = dns.record_url(&zone(), &apex).unwrap();
        let www_url = dns.record_url(&zone(), &www).unwrap();

        assert!(apex_url.path().ends_with("/dnsZones/example.com/NS/@"));
        assert!(www_url.path().ends_with("/dnsZones/example.com/CNAME/www"));
    }

    #[test]
    fn next_link_is_followed_verbatim() {
        let base = url::Url::parse(super::super::DEFAULT_BASE_URL).unwrap();
        let link = "https://management.azure.com/x?api-version=2018-05-01&$skipToken=abc";
        assert_eq!(next_page(&base, link).unwrap().as_str(), link);
        assert!(next_page(&base, "not a url").is_err());
    }

    #[test]
    fn rejects_unusable_config() {
        let mut cfg = config(super::super::DEFAULT_BASE_URL);
        cfg.resource_group = String::new();
        assert!(AzureDns::try_from(cfg).is_err());

        let mut cfg = config(super::super::DEFAULT_BASE_URL);
        cfg.subscription = String::new();
        assert!(AzureDns::try_from(cfg).is_err());
    }

    #[test]
    fn unreachable_api_surfaces_request_error() {
        let mut dns = AzureDns::try_from(config("http://127.0.0.1:1/")).unwrap();

        let err = dns.list_records(&zone()).unwrap_err();

        assert!(matches!(err, Error::RequestError { .. }), "{err}");
    }
}
