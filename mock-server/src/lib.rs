use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Page size used when a request carries no positive `limit`.
pub const DEFAULT_LIMIT: usize = 25;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    pub indicator: String,
    #[serde(rename = "type")]
    pub indicator_type: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Descriptor {
    pub id: String,
    pub indicator: Indicator,
    pub owner: Member,
    #[serde(rename = "type")]
    pub indicator_type: String,
    pub raw_indicator: String,
    pub description: String,
    pub status: String,
    pub privacy_type: String,
    pub share_level: String,
    pub added_on: String,
    pub confidence: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MalwareAnalysis {
    pub id: String,
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    pub sample_type: String,
    pub share_level: String,
    pub status: String,
    pub submitter_count: String,
    pub victim_count: u64,
    pub added_on: String,
    pub privacy_type: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MalwareFamily {
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub family_type: String,
    pub malicious: String,
    pub sample_count: u64,
    pub submitter_count: u64,
    pub added_on: String,
}

/// In-memory contents of the stub API.
#[derive(Clone, Debug, Default)]
pub struct Fixtures {
    pub access_token: String,
    pub members: Vec<Member>,
    pub descriptors: Vec<Descriptor>,
    pub malware_analyses: Vec<MalwareAnalysis>,
    pub malware_families: Vec<MalwareFamily>,
}

impl Fixtures {
    /// A small fixed data set plus `malware_count` generated analyses.
    pub fn generated(access_token: &str, malware_count: usize) -> Self {
        let members = vec![
            member("1001", "Acme Security", "soc@acme.example"),
            member("1002", "Example CERT", "cert@example.org"),
            member("1003", "Blue Team Ltd", "intel@blueteam.example"),
        ];
        let descriptors = vec![
            descriptor("2001", "198.51.100.7", "IP_ADDRESS", "open proxy used for scanning", &members[0]),
            descriptor("2002", "203.0.113.9", "IP_ADDRESS", "botnet command server", &members[1]),
            descriptor("2003", "evil-domain.biz", "DOMAIN", "domain hosting malware", &members[1]),
            descriptor("2004", "198.51.100.23", "IP_ADDRESS", "residential proxy exit", &members[2]),
        ];
        let malware_analyses = (0..malware_count)
            .map(|i| MalwareAnalysis {
                id: (3000 + i).to_string(),
                md5: format!("{i:032x}"),
                sha1: format!("{i:040x}"),
                sha256: format!("{i:064x}"),
                sample_type: "application/x-dosexec".to_string(),
                share_level: "AMBER".to_string(),
                status: "MALICIOUS".to_string(),
                submitter_count: "1".to_string(),
                victim_count: (i % 7) as u64,
                added_on: (1391813489 + i as u64 * 60).to_string(),
                privacy_type: "VISIBLE".to_string(),
            })
            .collect();
        let malware_families = vec![
            MalwareFamily {
                id: "4001".to_string(),
                name: "Zeus".to_string(),
                aliases: vec!["Zbot".to_string()],
                description: "banking trojan".to_string(),
                family_type: "BANKING".to_string(),
                malicious: "MALICIOUS".to_string(),
                sample_count: 120,
                submitter_count: 4,
                added_on: "2014-02-08T00:00:00+0000".to_string(),
            },
            MalwareFamily {
                id: "4002".to_string(),
                name: "Conficker".to_string(),
                aliases: vec!["Downadup".to_string(), "Kido".to_string()],
                description: "network worm".to_string(),
                family_type: "WORM".to_string(),
                malicious: "MALICIOUS".to_string(),
                sample_count: 48,
                submitter_count: 2,
                added_on: "2014-02-09T00:00:00+0000".to_string(),
            },
        ];
        Self {
            access_token: access_token.to_string(),
            members,
            descriptors,
            malware_analyses,
            malware_families,
        }
    }

    /// Every record as JSON, looked up by id for object requests.
    fn object(&self, id: &str) -> Option<Value> {
        let found = self
            .descriptors
            .iter()
            .find(|d| d.id == id)
            .map(serde_json::to_value)
            .or_else(|| self.malware_analyses.iter().find(|m| m.id == id).map(serde_json::to_value))
            .or_else(|| self.malware_families.iter().find(|f| f.id == id).map(serde_json::to_value))
            .or_else(|| self.members.iter().find(|m| m.id == id).map(serde_json::to_value))?;
        found.ok()
    }
}

fn member(id: &str, name: &str, email: &str) -> Member {
    Member {
        id: id.to_string(),
        name: Some(name.to_string()),
        email: Some(email.to_string()),
    }
}

fn descriptor(id: &str, value: &str, kind: &str, description: &str, owner: &Member) -> Descriptor {
    Descriptor {
        id: id.to_string(),
        indicator: Indicator {
            id: format!("9{id}"),
            indicator: value.to_string(),
            indicator_type: kind.to_string(),
        },
        owner: owner.clone(),
        indicator_type: kind.to_string(),
        raw_indicator: value.to_string(),
        description: description.to_string(),
        status: "MALICIOUS".to_string(),
        privacy_type: "VISIBLE".to_string(),
        share_level: "GREEN".to_string(),
        added_on: "2014-02-08T10:00:00+0000".to_string(),
        confidence: 75,
    }
}

type Params = Vec<(String, String)>;
type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub fn app(fixtures: Fixtures) -> Router {
    Router::new()
        .route("/{version}/{*path}", get(dispatch))
        .with_state(Arc::new(fixtures))
}

pub async fn run(listener: TcpListener, fixtures: Fixtures) -> Result<(), std::io::Error> {
    axum::serve(listener, app(fixtures)).await
}

/// `/{version}/{resource}/` lists a collection; `/{version}/{id}` reads one
/// object.
async fn dispatch(
    State(fixtures): State<Arc<Fixtures>>,
    Path((version, path)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> ApiResult {
    if param(&params, "access_token") != Some(fixtures.access_token.as_str()) {
        return Err(graph_error(
            StatusCode::BAD_REQUEST,
            "OAuthException",
            "Invalid OAuth access token.",
        ));
    }
    match path.strip_suffix('/') {
        Some(resource) => list(&fixtures, &version, resource, &params),
        None => object(&fixtures, &path, &params),
    }
}

fn list(fixtures: &Fixtures, version: &str, resource: &str, params: &Params) -> ApiResult {
    let text = param(params, "text").unwrap_or_default().to_lowercase();
    let records: Vec<Value> = match resource {
        "threat_descriptors" => {
            let kind = param(params, "type");
            fixtures
                .descriptors
                .iter()
                .filter(|d| kind.is_none_or(|k| d.indicator_type == k))
                .filter(|d| {
                    d.description.to_lowercase().contains(&text)
                        || d.raw_indicator.to_lowercase().contains(&text)
                })
                .map(to_json)
                .collect()
        }
        "malware_analyses" => fixtures.malware_analyses.iter().map(to_json).collect(),
        "malware_families" => fixtures
            .malware_families
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&text))
            .map(to_json)
            .collect(),
        "threat_exchange_members" => fixtures.members.iter().map(to_json).collect(),
        _ => {
            return Err(graph_error(
                StatusCode::NOT_FOUND,
                "GraphMethodException",
                &format!("Unknown path components: /{resource}"),
            ))
        }
    };
    Ok(Json(page(version, resource, records, params)))
}

/// Slices one page out of `records`. Cursors are plain offsets.
fn page(version: &str, resource: &str, records: Vec<Value>, params: &Params) -> Value {
    let limit = param(params, "limit")
        .and_then(|l| l.parse::<usize>().ok())
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIMIT);
    let start = param(params, "after")
        .and_then(|a| a.parse::<usize>().ok())
        .unwrap_or(0)
        .min(records.len());
    let end = start.saturating_add(limit).min(records.len());
    let data = records[start..end].to_vec();

    let mut body = json!({
        "data": data,
        "paging": {"cursors": {"before": start.to_string(), "after": end.to_string()}},
    });
    if end < records.len() {
        let next = format!("/{version}/{resource}/?limit={limit}&after={end}");
        body["paging"]["next"] = json!(next);
        body["next"] = json!(next);
    }
    body
}

fn object(fixtures: &Fixtures, id: &str, params: &Params) -> ApiResult {
    let Some(Value::Object(mut record)) = fixtures.object(id) else {
        return Err(graph_error(
            StatusCode::NOT_FOUND,
            "GraphMethodException",
            &format!("Unsupported get request. Object with ID '{id}' does not exist"),
        ));
    };
    if let Some(fields) = param(params, "fields") {
        let wanted: Vec<&str> = fields.split(',').collect();
        record.retain(|key, _| key == "id" || wanted.contains(&key.as_str()));
    }
    Ok(Json(Value::Object(record)))
}

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn to_json<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or(Value::Null)
}

fn graph_error(status: StatusCode, kind: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({"error": {"message": message, "type": kind, "code": status.as_u16()}})),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn numbers(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({"id": i.to_string()})).collect()
    }

    #[test]
    fn generated_fixtures_have_requested_malware_count() {
        let fixtures = Fixtures::generated("a|b", 266);
        assert_eq!(fixtures.malware_analyses.len(), 266);
        assert_eq!(fixtures.access_token, "a|b");
        assert_eq!(fixtures.malware_analyses[0].md5.len(), 32);
    }

    #[test]
    fn page_defaults_to_default_limit() {
        let body = page("v2.5", "malware_analyses", numbers(30), &params(&[]));
        assert_eq!(body["data"].as_array().unwrap().len(), DEFAULT_LIMIT);
        assert_eq!(body["paging"]["cursors"]["after"], "25");
        assert_eq!(body["next"], "/v2.5/malware_analyses/?limit=25&after=25");
    }

    #[test]
    fn page_resumes_after_cursor() {
        let body = page(
            "v2.5",
            "malware_analyses",
            numbers(30),
            &params(&[("limit", "10"), ("after", "25")]),
        );
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 5);
        assert_eq!(data[0]["id"], "25");
        assert!(body.get("next").is_none());
    }

    #[test]
    fn page_accepts_maximum_limit() {
        let body = page(
            "v2.5",
            "x",
            numbers(3),
            &params(&[("limit", "18446744073709551615"), ("after", "1")]),
        );
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert!(body.get("next").is_none());
    }

    #[test]
    fn page_ignores_non_positive_limit() {
        let body = page("v2.5", "x", numbers(3), &params(&[("limit", "0")]));
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn object_lookup_trims_to_fields() {
        let fixtures = Fixtures::generated("t", 1);
        let Json(body) = object(&fixtures, "3000", &params(&[("fields", "md5")])).unwrap();
        let record = body.as_object().unwrap();
        assert_eq!(record.len(), 2);
        assert!(record.contains_key("id"));
        assert!(record.contains_key("md5"));
    }
}
