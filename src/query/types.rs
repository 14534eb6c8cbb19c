//! Data source and query wire types.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A configured data source, as handed to query handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub org_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub ds_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub json_data: serde_json::Value,
}

impl DataSource {
    pub fn new(name: impl Into<String>, ds_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ds_type: ds_type.into(),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_org(mut self, org_id: i64) -> Self {
        self.org_id = org_id;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// The window ending now.
    pub fn last(span: Duration) -> Self {
        let to = Utc::now();
        Self { from: to - span, to }
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }
}

/// One query target within a request, identified by its ref id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSubQuery {
    pub ref_id: String,
    #[serde(default)]
    pub model: serde_json::Value,
    #[serde(default)]
    pub interval_ms: i64,
    #[serde(default)]
    pub max_data_points: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query_type: String,
}

impl DataSubQuery {
    pub fn new(ref_id: impl Into<String>, model: serde_json::Value) -> Self {
        Self {
            ref_id: ref_id.into(),
            model,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default)]
    pub queries: Vec<DataSubQuery>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub debug: bool,
}

impl DataQuery {
    pub fn new(queries: Vec<DataSubQuery>) -> Self {
        Self {
            queries,
            ..Default::default()
        }
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn ref_ids(&self) -> impl Iterator<Item = &str> {
        self.queries.iter().map(|q| q.ref_id.as_str())
    }
}

/// Result for a single ref id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub ref_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<serde_json::Value>,
}

impl QueryResult {
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            ..Default::default()
        }
    }

    pub fn with_frame(mut self, frame: serde_json::Value) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn failed(ref_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    #[serde(default)]
    pub results: BTreeMap<String, QueryResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DataResponse {
    pub fn insert(&mut self, result: QueryResult) {
        self.results.insert(result.ref_id.clone(), result);
    }

    pub fn get(&self, ref_id: &str) -> Option<&QueryResult> {
        self.results.get(ref_id)
    }
}

impl FromIterator<QueryResult> for DataResponse {
    fn from_iter<I: IntoIterator<Item = QueryResult>>(iter: I) -> Self {
        let mut response = Self::default();
        for result in iter {
            response.insert(result);
        }
        response
    }
}
