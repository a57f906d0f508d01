//! Firestore REST client and the live [`DataSource`].
//!
//! Uses reqwest against `https://firestore.googleapis.com/v1`, authenticated
//! with the web API key as a `key` query parameter. The client is built
//! once from [`FirebaseConfig`] and injected into [`FirestoreSource`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use url::Url;

use super::document::{decode_document, document_id, encode_fields, encode_record, encode_value};
use super::{DataSource, SourceKind};
use crate::config::{Config, FirebaseConfig};
use crate::dates::WeekRange;
use crate::error::{FieldOpsError, Result};
use crate::types::{ScheduleEntry, Site, SitePatch, SiteTask, Task, TaskStatus, VisitLog};

const FIRESTORE_API_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;

pub const SITES: &str = "sites";
pub const TASKS: &str = "tasks";
pub const SCHEDULE_ENTRIES: &str = "scheduleEntries";
/// Flat schedule list read by the dashboard overview.
pub const SCHEDULE: &str = "schedule";
pub const VISIT_LOGS: &str = "visitLogs";

/// Comparison used in a structured query field filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl FilterOp {
    fn as_str(self) -> &'static str {
        match self {
            FilterOp::Equal => "EQUAL",
            FilterOp::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            FilterOp::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Build the `structuredQuery` body for `:runQuery`.
pub fn structured_query(
    collection: &str,
    filters: &[FieldFilter],
    order_by: Option<(&str, Direction)>,
) -> Value {
    let mut query = Map::new();
    query.insert("from".to_string(), json!([{ "collectionId": collection }]));

    let field_filters: Vec<Value> = filters
        .iter()
        .map(|f| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": f.field },
                    "op": f.op.as_str(),
                    "value": encode_value(&f.value),
                }
            })
        })
        .collect();
    match field_filters.len() {
        0 => {}
        1 => {
            query.insert("where".to_string(), field_filters[0].clone());
        }
        _ => {
            query.insert(
                "where".to_string(),
                json!({ "compositeFilter": { "op": "AND", "filters": field_filters } }),
            );
        }
    }

    if let Some((field, direction)) = order_by {
        let dir = match direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        query.insert(
            "orderBy".to_string(),
            json!([{ "field": { "fieldPath": field }, "direction": dir }]),
        );
    }

    json!({ "structuredQuery": Value::Object(query) })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryRow {
    #[serde(default)]
    document: Option<Value>,
}

pub struct FirestoreClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: String,
}

impl FirestoreClient {
    /// Fails with `NotConfigured` unless every required Firebase value is set.
    pub fn from_config(firebase: &FirebaseConfig, timeout: Duration) -> Result<Self> {
        if !firebase.is_configured() {
            return Err(FieldOpsError::NotConfigured);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: firebase
                .base_url
                .clone()
                .unwrap_or_else(|| FIRESTORE_API_URL.to_string()),
            project_id: firebase.project_id.clone().unwrap_or_default(),
            api_key: firebase.api_key.clone().unwrap_or_default(),
        })
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }

    /// URL for a collection or document under the database root. Each
    /// segment is percent-encoded, so ids may contain `/`, `?` or `#`.
    pub fn document_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.documents_root())
            .map_err(|e| FieldOpsError::Decode(format!("bad document URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| FieldOpsError::Decode("base URL cannot hold a path".to_string()))?
            .extend(segments);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn run_query_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("{}:runQuery", self.documents_root()))
            .map_err(|e| FieldOpsError::Decode(format!("bad query URL: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn read_json(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(FieldOpsError::Api {
                status: status.as_u16(),
                message: text,
            });
        }
        Ok(resp.json().await?)
    }

    /// Every document in a collection, following page tokens.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Value>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = self.document_url(&[collection])?;
            url.query_pairs_mut()
                .append_pair("pageSize", &PAGE_SIZE.to_string());
            if let Some(ref token) = page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }
            let body = Self::read_json(self.client.get(url).send().await?).await?;
            let page: ListDocumentsResponse = serde_json::from_value(body)?;
            documents.extend(page.documents);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        log::debug!("Firestore: {} documents in {}", documents.len(), collection);
        Ok(documents)
    }

    /// `None` when the document does not exist.
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let url = self.document_url(&[collection, id])?;
        let resp = self.client.get(url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::read_json(resp).await.map(Some)
    }

    /// Create a document with a generated id.
    pub async fn create_document(&self, collection: &str, fields: Map<String, Value>) -> Result<Value> {
        let url = self.document_url(&[collection])?;
        let resp = self
            .client
            .post(url)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        Self::read_json(resp).await
    }

    /// Write only the masked fields of a document, leaving the rest intact.
    ///
    /// With `must_exist` the write fails on a missing document (update);
    /// without it the document is created when absent (upsert). An empty
    /// mask is refused: Firestore reads an unmasked PATCH as a full replace.
    pub async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        mask: &[String],
        must_exist: bool,
    ) -> Result<Value> {
        if mask.is_empty() {
            return Err(FieldOpsError::Validation(format!(
                "refusing unmasked write to {collection}/{id}"
            )));
        }
        let mut url = self.document_url(&[collection, id])?;
        {
            let mut pairs = url.query_pairs_mut();
            for field in mask {
                pairs.append_pair("updateMask.fieldPaths", field);
            }
            if must_exist {
                pairs.append_pair("currentDocument.exists", "true");
            }
        }
        let resp = self
            .client
            .patch(url)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        Self::read_json(resp).await
    }

    pub async fn run_query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
        order_by: Option<(&str, Direction)>,
    ) -> Result<Vec<Value>> {
        let body = structured_query(collection, filters, order_by);
        let resp = self
            .client
            .post(self.run_query_url()?)
            .json(&body)
            .send()
            .await?;
        let rows: Vec<RunQueryRow> = serde_json::from_value(Self::read_json(resp).await?)?;
        Ok(rows.into_iter().filter_map(|r| r.document).collect())
    }
}

/// Generated id of a freshly created document.
fn created_id(doc: &Value) -> String {
    doc.get("name")
        .and_then(Value::as_str)
        .map(|n| document_id(n).to_string())
        .unwrap_or_default()
}

fn decode_all<T: serde::de::DeserializeOwned>(docs: &[Value]) -> Result<Vec<T>> {
    docs.iter().map(decode_document).collect()
}

/// Live-store data source.
pub struct FirestoreSource {
    client: FirestoreClient,
}

impl FirestoreSource {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        Ok(Self::new(FirestoreClient::from_config(&config.firebase, timeout)?))
    }

    async fn update_fields(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        let Value::Object(map) = fields else {
            return Err(FieldOpsError::Decode("update is not an object".to_string()));
        };
        if map.is_empty() {
            log::debug!("Firestore: nothing to update on {collection}/{id}");
            return Ok(());
        }
        let mask: Vec<String> = map.keys().cloned().collect();
        self.client
            .patch_document(collection, id, encode_fields(&map), &mask, true)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DataSource for FirestoreSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    async fn list_sites(&self) -> Result<Vec<Site>> {
        decode_all(&self.client.list_documents(SITES).await?)
    }

    async fn get_site(&self, id: &str) -> Result<Option<Site>> {
        match self.client.get_document(SITES, id).await? {
            Some(doc) => Ok(Some(decode_document(&doc)?)),
            None => Ok(None),
        }
    }

    async fn create_site(&self, site: Site) -> Result<Site> {
        let (fields, _) = encode_record(&site)?;
        let doc = self.client.create_document(SITES, fields).await?;
        Ok(Site {
            id: created_id(&doc),
            ..site
        })
    }

    async fn update_site(&self, id: &str, patch: &SitePatch) -> Result<()> {
        self.update_fields(SITES, id, serde_json::to_value(patch)?).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        decode_all(&self.client.list_documents(TASKS).await?)
    }

    async fn tasks_due_on(&self, day: &str) -> Result<Vec<Task>> {
        let filters = [FieldFilter::new("dueDate", FilterOp::Equal, day)];
        decode_all(&self.client.run_query(TASKS, &filters, None).await?)
    }

    async fn create_task(&self, task: Task) -> Result<Task> {
        let (fields, _) = encode_record(&task)?;
        let doc = self.client.create_document(TASKS, fields).await?;
        let id = created_id(&doc);
        Ok(Task { id, ..task })
    }

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<()> {
        self.update_fields(TASKS, id, json!({ "status": status })).await
    }

    async fn site_tasks(&self, site_id: &str) -> Result<Vec<SiteTask>> {
        let filters = [FieldFilter::new("siteId", FilterOp::Equal, site_id)];
        decode_all(&self.client.run_query(TASKS, &filters, None).await?)
    }

    async fn set_site_task_done(
        &self,
        id: &str,
        is_done: bool,
        last_completed_on: Option<&str>,
    ) -> Result<()> {
        self.update_fields(
            TASKS,
            id,
            json!({ "isDone": is_done, "lastCompletedOn": last_completed_on }),
        )
        .await
    }

    async fn update_site_task_notes(&self, id: &str, notes: &str) -> Result<()> {
        self.update_fields(TASKS, id, json!({ "notes": notes })).await
    }

    async fn list_schedule(&self) -> Result<Vec<ScheduleEntry>> {
        decode_all(&self.client.list_documents(SCHEDULE).await?)
    }

    async fn weekly_schedule(&self, range: &WeekRange) -> Result<Vec<ScheduleEntry>> {
        let filters = [
            FieldFilter::new("day", FilterOp::GreaterThanOrEqual, range.start_iso()),
            FieldFilter::new("day", FilterOp::LessThanOrEqual, range.end_iso()),
        ];
        decode_all(&self.client.run_query(SCHEDULE_ENTRIES, &filters, None).await?)
    }

    async fn upsert_schedule_entry(&self, entry: &ScheduleEntry) -> Result<()> {
        let (fields, mask) = encode_record(entry)?;
        self.client
            .patch_document(SCHEDULE_ENTRIES, &entry.key(), fields, &mask, false)
            .await?;
        Ok(())
    }

    async fn log_visit(&self, visit: VisitLog) -> Result<VisitLog> {
        let (fields, _) = encode_record(&visit)?;
        let doc = self.client.create_document(VISIT_LOGS, fields).await?;
        let id = created_id(&doc);
        Ok(VisitLog { id, ..visit })
    }

    async fn visit_logs_by_site(&self, site_id: &str) -> Result<Vec<VisitLog>> {
        let filters = [FieldFilter::new("siteId", FilterOp::Equal, site_id)];
        decode_all(
            &self
                .client
                .run_query(VISIT_LOGS, &filters, Some(("visitDate", Direction::Descending)))
                .await?,
        )
    }
}
