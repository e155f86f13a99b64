use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::AirtableConfig;
use crate::error::AppError;
use crate::repository::RecordStore;
use crate::schemas::RawRecord;
use crate::transform::schema::{Attribute, rule};

#[derive(Deserialize)]
struct ListRecordsPage {
    #[serde(default)]
    records: Vec<RawRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Serialize)]
struct WriteRecord<'a> {
    fields: &'a Map<String, Value>,
    typecast: bool,
}

#[derive(Deserialize)]
struct DeletedRecord {
    #[serde(default)]
    deleted: bool,
}

pub struct AirtableClient {
    http: reqwest::Client,
    config: AirtableConfig,
}

impl AirtableClient {
    pub fn new(config: AirtableConfig, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, config })
    }

    /// `{api_url}/{base_id}/{table}[/{record_id}]`, each segment percent-encoded.
    fn table_url(&self, base_id: &str, record_id: Option<&str>) -> Result<Url, AppError> {
        table_url(&self.config.api_url, base_id, &self.config.table, record_id)
    }

    async fn fetch_all(&self, filter: Option<String>) -> Result<Vec<RawRecord>, AppError> {
        let (credential, base_id) = self.config.credentials()?;
        let url = self.table_url(base_id, None)?;

        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self.http.get(url.clone()).bearer_auth(credential);
            if let Some(formula) = &filter {
                request = request.query(&[("filterByFormula", formula)]);
            }
            if let Some(offset) = &offset {
                request = request.query(&[("offset", offset)]);
            }

            let page: ListRecordsPage = check_status(request.send().await?)
                .await?
                .json()
                .await?;
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        tracing::debug!(count = records.len(), "fetched records from Airtable");
        Ok(records)
    }
}

fn table_url(
    api_url: &str,
    base_id: &str,
    table: &str,
    record_id: Option<&str>,
) -> Result<Url, AppError> {
    let mut url = Url::parse(api_url).map_err(|e| {
        AppError::InternalServerError(format!("Invalid Airtable API URL {}: {}", api_url, e))
    })?;
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            AppError::InternalServerError(format!("Airtable API URL cannot be a base: {}", api_url))
        })?;
        segments.pop_if_empty().push(base_id).push(table);
        if let Some(id) = record_id {
            segments.push(id);
        }
    }
    Ok(url)
}

/// Airtable formula matching one investor's records exactly.
pub fn investor_formula(investor: &str) -> String {
    let escaped = investor.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "{{{}}} = '{}'",
        rule(Attribute::InvestorName).field,
        escaped
    )
}

async fn check_status(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(%status, body = %body, "Airtable returned an error");

    let reason = status.canonical_reason().unwrap_or(status.as_str());
    Err(AppError::UpstreamError(format!(
        "Airtable API error: {}",
        reason
    )))
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn list_records(&self) -> Result<Vec<RawRecord>, AppError> {
        self.fetch_all(None).await
    }

    async fn records_for_investor(&self, investor: &str) -> Result<Vec<RawRecord>, AppError> {
        self.fetch_all(Some(investor_formula(investor))).await
    }

    async fn create_record(&self, fields: Map<String, Value>) -> Result<RawRecord, AppError> {
        let (credential, base_id) = self.config.credentials()?;
        let url = self.table_url(base_id, None)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(credential)
            .json(&WriteRecord {
                fields: &fields,
                typecast: true,
            })
            .send()
            .await?;

        let record: RawRecord = check_status(response).await?.json().await?;
        tracing::info!(id = %record.id, "created Airtable record");
        Ok(record)
    }

    async fn update_record(
        &self,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<RawRecord, AppError> {
        let (credential, base_id) = self.config.credentials()?;
        let url = self.table_url(base_id, Some(id))?;

        let response = self
            .http
            .patch(url)
            .bearer_auth(credential)
            .json(&WriteRecord {
                fields: &fields,
                typecast: true,
            })
            .send()
            .await?;

        let record: RawRecord = check_status(response).await?.json().await?;
        tracing::info!(id = %record.id, "updated Airtable record");
        Ok(record)
    }

    async fn delete_record(&self, id: &str) -> Result<(), AppError> {
        let (credential, base_id) = self.config.credentials()?;
        let url = self.table_url(base_id, Some(id))?;

        let response = self.http.delete(url).bearer_auth(credential).send().await?;
        let deleted: DeletedRecord = check_status(response).await?.json().await?;

        if !deleted.deleted {
            return Err(AppError::UpstreamError(format!(
                "Airtable did not delete record {}",
                id
            )));
        }
        tracing::info!(id, "deleted Airtable record");
        Ok(())
    }
}
