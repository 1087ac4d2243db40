use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use leptos::logging::log;
use serde::{Deserialize, Serialize};

use crate::errors::SearchError;
use crate::http::{HttpClient, HttpReply};

// --- Resource kinds ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Parks,
    Campgrounds,
    VisitorCenters,
    Alerts,
    ThingsToDo,
}

impl ResourceKind {
    /// In the order the picker lists them.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Parks,
        ResourceKind::Campgrounds,
        ResourceKind::VisitorCenters,
        ResourceKind::ThingsToDo,
        ResourceKind::Alerts,
    ];

    /// Path segment under the API endpoint.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Parks => "parks",
            ResourceKind::Campgrounds => "campgrounds",
            ResourceKind::VisitorCenters => "visitorcenters",
            ResourceKind::Alerts => "alerts",
            ResourceKind::ThingsToDo => "thingstodo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Parks => "Parks",
            ResourceKind::Campgrounds => "Campgrounds",
            ResourceKind::VisitorCenters => "Visitor Centers",
            ResourceKind::Alerts => "Alerts",
            ResourceKind::ThingsToDo => "Things To Do",
        }
    }

    fn has_addresses(self) -> bool {
        matches!(
            self,
            ResourceKind::Parks | ResourceKind::Campgrounds | ResourceKind::VisitorCenters
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.path() == s)
            .ok_or_else(|| anyhow!("Unknown resource kind: {s}"))
    }
}

// --- Records ---

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(unused)]
pub struct ParkImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub name: Option<String>,
}

/// One item of any resource kind. Every field is optional since the
/// resource kinds share only part of their shape.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParkRecord {
    pub id: Option<String>,
    pub park_code: Option<String>,
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub states: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub images: Option<Vec<ParkImage>>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub activities: Option<Vec<Activity>>,
}

/// Empty strings count as missing.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ParkRecord {
    /// `fullName`, else `name`. Used to tell records apart when ids are missing.
    pub fn name_key(&self) -> Option<&str> {
        present(&self.full_name).or_else(|| present(&self.name))
    }

    pub fn display_title(&self) -> &str {
        self.name_key()
            .or_else(|| present(&self.title))
            .unwrap_or("(No title)")
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images
            .as_ref()?
            .first()
            .and_then(|image| present(&image.url))
    }

    pub fn activity_names(&self) -> Vec<String> {
        self.activities
            .iter()
            .flatten()
            .filter_map(|activity| present(&activity.name))
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ParksResponse {
    #[serde(default)]
    data: Option<Vec<ParkRecord>>,
}

// --- Queries ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub resource: ResourceKind,
    pub state_code: String,
    pub park_code: String,
    pub limit: u32,
}

pub const MAX_LIMIT: u32 = 50;

/// Parses the limit field. Anything that is not a positive number becomes 1.
pub fn parse_limit(raw: &str, max: u32) -> u32 {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(1)
        .min(max.max(1))
}

impl SearchQuery {
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let keyword = self.keyword.trim();
        if !keyword.is_empty() {
            params.push(("q".to_string(), keyword.to_string()));
        }
        let state_code = self.state_code.trim();
        if !state_code.is_empty() {
            params.push(("stateCode".to_string(), state_code.to_uppercase()));
        }
        let park_code = self.park_code.trim();
        if !park_code.is_empty() {
            params.push(("parkCode".to_string(), park_code.to_lowercase()));
        }
        params.push((
            "limit".to_string(),
            self.limit.clamp(1, MAX_LIMIT).to_string(),
        ));
        let mut fields = vec!["images", "activities"];
        if self.resource.has_addresses() {
            fields.push("addresses");
        }
        params.push(("fields".to_string(), fields.join(",")));
        params
    }

    pub fn to_request(&self, endpoint: &str, api_key: &str) -> ParksRequest {
        ParksRequest {
            url: format!("{}/{}", endpoint.trim_end_matches('/'), self.resource.path()),
            params: self.to_params(),
            api_key: api_key.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParksRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub api_key: String,
}

// --- Transport ---

#[allow(async_fn_in_trait)]
pub trait ParksTransport {
    async fn fetch(&self, request: &ParksRequest) -> anyhow::Result<HttpReply>;
}

impl ParksTransport for HttpClient {
    async fn fetch(&self, request: &ParksRequest) -> anyhow::Result<HttpReply> {
        self.get(
            &request.url,
            &request.params,
            &[
                ("X-Api-Key", request.api_key.as_str()),
                ("Accept", "application/json"),
            ],
        )
        .await
    }
}

/// Runs one search request and validates the reply.
pub async fn fetch_records<T: ParksTransport>(
    transport: &T,
    request: &ParksRequest,
) -> Result<Vec<ParkRecord>, SearchError> {
    if request.api_key.is_empty() {
        return Err(SearchError::Auth);
    }

    log!("[DEBUG] [NPS] GET {} {:?}", request.url, request.params);
    let reply = transport.fetch(request).await.map_err(|e| {
        log!("[ERROR] [NPS] Transport error: {:#}", e);
        SearchError::Request(e.to_string())
    })?;

    if !reply.is_success() {
        log!("[WARN] [NPS] Request failed with status {}", reply.status);
        return Err(match reply.status {
            403 => SearchError::Forbidden,
            429 => SearchError::RateLimited,
            status => SearchError::Request(format!("status {status}")),
        });
    }

    let parsed: ParksResponse = serde_json::from_str(&reply.body).map_err(|e| {
        log!("[ERROR] [NPS] Failed to parse response: {}", e);
        SearchError::Request(format!("unexpected response: {e}"))
    })?;
    let records = parsed.data.unwrap_or_default();
    if records.is_empty() {
        return Err(SearchError::Empty);
    }
    log!("[INFO] [NPS] Received {} records", records.len());
    Ok(records)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;

    /// Replays canned replies and records every request it sees.
    #[derive(Default)]
    pub(crate) struct FakeParks {
        pub replies: RefCell<Vec<anyhow::Result<HttpReply>>>,
        pub seen: RefCell<Vec<ParksRequest>>,
    }

    impl FakeParks {
        pub fn replying(status: u16, body: &str) -> Self {
            let fake = Self::default();
            fake.replies.borrow_mut().push(Ok(HttpReply {
                status,
                body: body.to_string(),
            }));
            fake
        }
    }

    impl ParksTransport for FakeParks {
        async fn fetch(&self, request: &ParksRequest) -> anyhow::Result<HttpReply> {
            self.seen.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err(anyhow!("no reply queued")))
        }
    }

    pub(crate) const YOSEMITE: &str = r#"{
        "total": "1",
        "data": [{
            "id": "4324B2B4-D1A3-497F-8E6B-27171FAE4DB2",
            "parkCode": "yose",
            "fullName": "Yosemite National Park",
            "name": "Yosemite",
            "states": "CA",
            "description": "Not just a great valley.",
            "url": "https://www.nps.gov/yose/index.htm",
            "latitude": "37.84883288",
            "longitude": "-119.5571873",
            "images": [{"url": "https://www.nps.gov/common/yose.jpg", "altText": "Half Dome"}],
            "activities": [{"id": "1", "name": "Hiking"}, {"id": "2", "name": "Camping"}],
            "addresses": [{"city": "Yosemite National Park"}]
        }]
    }"#;

    fn query(resource: ResourceKind) -> SearchQuery {
        SearchQuery {
            keyword: "  Yosemite ".to_string(),
            resource,
            state_code: " ca".to_string(),
            park_code: "YOSE ".to_string(),
            limit: 8,
        }
    }

    #[test]
    fn params_are_normalized() {
        let params = query(ResourceKind::Parks).to_params();
        let expected: Vec<(String, String)> = [
            ("q", "Yosemite"),
            ("stateCode", "CA"),
            ("parkCode", "yose"),
            ("limit", "8"),
            ("fields", "images,activities,addresses"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(params, expected);
    }

    #[test]
    fn empty_filters_are_omitted_and_alerts_skip_addresses() {
        let q = SearchQuery {
            keyword: "   ".to_string(),
            resource: ResourceKind::Alerts,
            state_code: String::new(),
            park_code: String::new(),
            limit: 500,
        };
        let params = q.to_params();
        assert_eq!(
            params,
            vec![
                ("limit".to_string(), "50".to_string()),
                ("fields".to_string(), "images,activities".to_string()),
            ]
        );
    }

    #[test]
    fn request_targets_resource_path() {
        let request =
            query(ResourceKind::ThingsToDo).to_request("https://developer.nps.gov/api/v1/", " k ");
        assert_eq!(request.url, "https://developer.nps.gov/api/v1/thingstodo");
        assert_eq!(request.api_key, "k");
    }

    #[test]
    fn resource_kind_round_trips_through_path() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.path().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!("trails".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn parse_limit_falls_back_to_one() {
        assert_eq!(parse_limit("12", 50), 12);
        assert_eq!(parse_limit("0", 50), 1);
        assert_eq!(parse_limit("abc", 50), 1);
        assert_eq!(parse_limit("99", 50), 50);
    }

    #[test]
    fn successful_reply_is_parsed() {
        let fake = FakeParks::replying(200, YOSEMITE);
        let request = query(ResourceKind::Parks).to_request("https://x", "key");
        let records = block_on(fetch_records(&fake, &request)).unwrap();

        assert_eq!(records.len(), 1);
        let park = &records[0];
        assert_eq!(park.display_title(), "Yosemite National Park");
        assert_eq!(park.first_image(), Some("https://www.nps.gov/common/yose.jpg"));
        assert_eq!(park.activity_names(), vec!["Hiking", "Camping"]);
        assert_eq!(fake.seen.borrow()[0].api_key, "key");
    }

    #[test]
    fn statuses_map_to_errors() {
        let request = query(ResourceKind::Parks).to_request("https://x", "key");
        for (status, expected) in [
            (403, SearchError::Forbidden),
            (429, SearchError::RateLimited),
            (500, SearchError::Request("status 500".to_string())),
        ] {
            let fake = FakeParks::replying(status, "{}");
            assert_eq!(block_on(fetch_records(&fake, &request)), Err(expected));
        }
    }

    #[test]
    fn zero_items_is_an_empty_result() {
        let request = query(ResourceKind::Parks).to_request("https://x", "key");
        for body in [r#"{"data": []}"#, "{}"] {
            let fake = FakeParks::replying(200, body);
            assert_eq!(block_on(fetch_records(&fake, &request)), Err(SearchError::Empty));
        }
    }

    #[test]
    fn missing_key_never_reaches_the_network() {
        let fake = FakeParks::replying(200, YOSEMITE);
        let request = query(ResourceKind::Parks).to_request("https://x", "   ");
        assert_eq!(block_on(fetch_records(&fake, &request)), Err(SearchError::Auth));
        assert!(fake.seen.borrow().is_empty());
    }

    #[test]
    fn malformed_body_is_a_request_error() {
        let fake = FakeParks::replying(200, "<html>");
        let request = query(ResourceKind::Parks).to_request("https://x", "key");
        assert!(matches!(
            block_on(fetch_records(&fake, &request)),
            Err(SearchError::Request(_))
        ));
    }

    #[test]
    fn null_activity_names_are_skipped() {
        let body = r#"{"data": [{"id": "1", "fullName": "Zion National Park",
            "activities": [{"id": "a", "name": null}, {"id": "b", "name": "Hiking"}, {"id": "c"}]}]}"#;
        let fake = FakeParks::replying(200, body);
        let request = query(ResourceKind::Parks).to_request("https://x", "key");
        let records = block_on(fetch_records(&fake, &request)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].activity_names(), vec!["Hiking"]);
    }

    #[test]
    fn title_falls_back_through_names() {
        let mut record = ParkRecord {
            title: Some("Trail closure".to_string()),
            full_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(record.display_title(), "Trail closure");
        record.title = None;
        assert_eq!(record.display_title(), "(No title)");
        record.name = Some("Zion".to_string());
        assert_eq!(record.display_title(), "Zion");
    }
}
