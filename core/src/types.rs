//! Response DTOs for the ThreatExchange graph API.
//!
//! # Design
//! These types mirror the API's JSON schema. Apart from `id`, every record
//! field is optional because the graph API only returns the fields it was
//! asked for. They are defined independently of the mock-server crate; the
//! integration tests catch schema drift between the two.

use serde::{Deserialize, Deserializer, Serialize};

/// The value returned by every fetch: the decoded result plus the exact body
/// text it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub raw: String,
}

/// A list envelope: one page of records plus pagination hints.
///
/// The client never follows `next` or the cursors itself. To continue, pass
/// a cursor back through `Query::after` or `Query::before`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cursor pointing past the last record of this page.
    pub fn after_cursor(&self) -> Option<&str> {
        self.paging.as_ref()?.cursors.as_ref()?.after.as_deref()
    }

    /// Cursor pointing before the first record of this page.
    pub fn before_cursor(&self) -> Option<&str> {
        self.paging.as_ref()?.cursors.as_ref()?.before.as_deref()
    }

    /// URL of the next page, from `paging.next` or the top-level `next`.
    pub fn next_page_url(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_deref())
            .or(self.next.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paging {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursors: Option<Cursors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

/// Opaque pagination tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cursors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// A threat indicator as submitted by one member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreatDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<IndicatorResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub indicator_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndicatorResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub indicator_type: Option<String>,
}

/// A member account. Appears as a descriptor's owner and in the member
/// directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A malware sample analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MalwareResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crx: Option<String>,
    #[serde(rename = "imphash", default, skip_serializing_if = "Option::is_none")]
    pub pe_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "pe_rich_header", default, skip_serializing_if = "Option::is_none")]
    pub pe_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssdeep: Option<String>,
    /// Sent as a string by the API for this resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victim_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_type: Option<String>,
}

/// A malware family grouping related samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MalwareFamilyResult {
    pub id: String,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malicious: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_count: Option<u64>,
}

/// Treats an explicit JSON `null` list like an absent one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

pub type ThreatDescriptorResults = Page<ThreatDescriptor>;
pub type MalwareResults = Page<MalwareResult>;
pub type MalwareFamiliesResults = Page<MalwareFamilyResult>;
pub type OwnersResults = Page<Owner>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_decodes_nested_records() {
        let json = r#"{
            "id": "810975008991121",
            "indicator": {"id": "7", "indicator": "evil-domain.biz", "type": "DOMAIN"},
            "owner": {"id": "42", "name": "Example Org", "email": "sec@example.org"},
            "type": "DOMAIN",
            "status": "MALICIOUS",
            "confidence": 75
        }"#;
        let descriptor: ThreatDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.id, "810975008991121");
        assert_eq!(descriptor.indicator_type.as_deref(), Some("DOMAIN"));
        assert_eq!(
            descriptor.indicator.unwrap().indicator.as_deref(),
            Some("evil-domain.biz")
        );
        assert_eq!(descriptor.owner.unwrap().name.as_deref(), Some("Example Org"));
        assert_eq!(descriptor.confidence, Some(75));
        assert!(descriptor.expired_on.is_none());
    }

    #[test]
    fn malware_uses_wire_names() {
        let json = r#"{"id":"1","imphash":"abc","pe_rich_header":"def","submitter_count":"3","victim_count":9}"#;
        let malware: MalwareResult = serde_json::from_str(json).unwrap();
        assert_eq!(malware.pe_hash.as_deref(), Some("abc"));
        assert_eq!(malware.pe_header.as_deref(), Some("def"));
        assert_eq!(malware.submitter_count.as_deref(), Some("3"));
        assert_eq!(malware.victim_count, Some(9));
    }

    #[test]
    fn page_requires_data() {
        let result: Result<Page<Owner>, _> = serde_json::from_str(r#"{"paging":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn page_exposes_cursors_and_next() {
        let json = r#"{
            "data": [{"id":"1"}],
            "paging": {"cursors": {"before": "b0", "after": "a1"}, "next": "https://next"}
        }"#;
        let page: Page<Owner> = serde_json::from_str(json).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.after_cursor(), Some("a1"));
        assert_eq!(page.before_cursor(), Some("b0"));
        assert_eq!(page.next_page_url(), Some("https://next"));
    }

    #[test]
    fn page_falls_back_to_top_level_next() {
        let page: Page<Owner> =
            serde_json::from_str(r#"{"data":[],"next":"https://top"}"#).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.after_cursor(), None);
        assert_eq!(page.next_page_url(), Some("https://top"));
    }

    #[test]
    fn family_aliases_default_to_empty() {
        let family: MalwareFamilyResult =
            serde_json::from_str(r#"{"id":"5","name":"Zeus","sample_count":12}"#).unwrap();
        assert!(family.aliases.is_empty());
        assert_eq!(family.sample_count, Some(12));
    }

    #[test]
    fn family_accepts_null_aliases() {
        let family: MalwareFamilyResult =
            serde_json::from_str(r#"{"id":"5","aliases":null,"name":"Zeus"}"#).unwrap();
        assert!(family.aliases.is_empty());
        assert_eq!(family.name.as_deref(), Some("Zeus"));
    }
}
