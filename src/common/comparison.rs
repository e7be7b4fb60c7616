use super::{Record, Zone};

/// First record in `records` named `name`.
pub(crate) fn find_record<'a>(name: &str, records: &'a [Record]) -> Option<&'a Record> {
    records.iter().find(|r| r.record_name() == name)
}

/// Whether two records differ in name, TTL, kind or payload.
///
/// Payloads compare as ordered lists, so a reordered address list counts
/// as a change.
pub fn record_is_different(r1: &Record, r2: &Record) -> bool {
    r1.record_name() != r2.record_name()
        || r1.time_to_live() != r2.time_to_live()
        || r1.record_type() != r2.record_type()
        || r1.rr_data() != r2.rr_data()
}

pub fn zones_equal(z1: &Zone, z2: &Zone) -> bool {
    z1.name == z2.name
        && z1.dns_name == z2.dns_name
        && z1.description == z2.description
        && z1.nameservers.len() == z2.nameservers.len()
        && z1
            .nameservers
            .iter()
            .zip(z2.nameservers.iter())
            .all(|(a, b)| a == b)
}
