use std::sync::Arc;

use crate::documents::{self, SortOrder};
use crate::error::AppError;
use crate::portfolio::build_portfolio_view;
use crate::repository::{FileListing, RecordStore};
use crate::schemas::{
    AdminRecord, CreateDocCenter, DocCenterLink, DocumentView, EmbedSnippet, PortfolioView,
    RecordInput,
};
use crate::transform::records::{WriteMode, admin_record, encode_input};
use crate::transform::{build_portfolio, distinct_investors};

fn required(value: Option<&str>, name: &str) -> Result<String, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or_else(|| AppError::ValidationError(format!("{} is required", name)))
}

pub struct PortfolioService {
    store: Arc<dyn RecordStore>,
}

impl PortfolioService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get_portfolio(&self, investor: &str) -> Result<PortfolioView, AppError> {
        let investor = required(Some(investor), "investor")?;

        let records = self.store.records_for_investor(&investor).await?;
        let portfolio = build_portfolio(&records).ok_or_else(|| {
            AppError::NotFoundError(format!("No holdings found for {}", investor))
        })?;

        tracing::info!(
            investor = %portfolio.investor,
            holdings = portfolio.holdings.len(),
            "built portfolio"
        );
        Ok(build_portfolio_view(portfolio))
    }

    pub async fn list_investors(&self) -> Result<Vec<String>, AppError> {
        let records = self.store.list_records().await?;
        Ok(distinct_investors(&records))
    }
}

pub struct AdminService {
    store: Arc<dyn RecordStore>,
    site_url: String,
}

impl AdminService {
    pub fn new(store: Arc<dyn RecordStore>, site_url: String) -> Self {
        Self { store, site_url }
    }

    pub async fn list_records(&self) -> Result<Vec<AdminRecord>, AppError> {
        let records = self.store.list_records().await?;
        Ok(records.iter().map(admin_record).collect())
    }

    pub async fn create_record(&self, input: RecordInput) -> Result<AdminRecord, AppError> {
        let fields = encode_input(&input, WriteMode::Create)?;
        let record = self.store.create_record(fields).await?;
        Ok(admin_record(&record))
    }

    pub async fn update_record(
        &self,
        id: &str,
        input: RecordInput,
    ) -> Result<AdminRecord, AppError> {
        let id = required(Some(id), "id")?;
        let fields = encode_input(&input, WriteMode::Update)?;
        if fields.is_empty() {
            return Err(AppError::ValidationError(
                "Nothing to update".to_string(),
            ));
        }

        let record = self.store.update_record(&id, fields).await?;
        Ok(admin_record(&record))
    }

    pub async fn delete_record(&self, id: &str) -> Result<(), AppError> {
        let id = required(Some(id), "id")?;
        self.store.delete_record(&id).await
    }

    pub fn embed_code(&self, investor: &str) -> Result<EmbedSnippet, AppError> {
        let investor = required(Some(investor), "investor")?;
        let (url, embed_code) = documents::dashboard_embed(&self.site_url, &investor)?;
        Ok(EmbedSnippet {
            investor,
            url,
            embed_code,
        })
    }
}

pub struct DocumentService {
    listing: Arc<dyn FileListing>,
    site_url: String,
}

impl DocumentService {
    pub fn new(listing: Arc<dyn FileListing>, site_url: String) -> Self {
        Self { listing, site_url }
    }

    pub fn create_doc_center(&self, req: CreateDocCenter) -> Result<DocCenterLink, AppError> {
        let (investor_name, folder_id) = match (
            required(req.investor_name.as_deref(), "investorName"),
            required(req.folder_id.as_deref(), "folderId"),
        ) {
            (Ok(name), Ok(folder)) => (name, folder),
            _ => {
                return Err(AppError::ValidationError(
                    "investorName and folderId are required".to_string(),
                ));
            }
        };

        let link = documents::doc_center_link(&self.site_url, &investor_name, &folder_id)?;
        tracing::info!(investor = %investor_name, url = %link.url, "created document center link");
        Ok(link)
    }

    pub async fn list_documents(
        &self,
        folder_id: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Vec<DocumentView>, AppError> {
        let folder_id = folder_id
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::ValidationError("Missing folder ID parameter".to_string()))?;
        let order = match sort {
            Some(raw) => raw.parse::<SortOrder>()?,
            None => SortOrder::default(),
        };

        let mut files = self.listing.list_files(folder_id).await?;
        documents::sort_files(&mut files, order);

        Ok(files.into_iter().map(documents::document_view).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    use super::*;
    use crate::repository::memory::{InMemoryStore, StaticListing};
    use crate::schemas::{FileDescriptor, RawRecord};

    fn make_record(id: &str, fields: Value) -> RawRecord {
        serde_json::from_value(json!({ "id": id, "fields": fields })).unwrap()
    }

    fn seeded_store() -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::with_records(vec![
            make_record(
                "rec1",
                json!({
                    "Investor Name": "Jane Doe",
                    "Security": "Laundry Sauce",
                    "Units Held": 1400,
                    "Issue Price / Unit": 1.5,
                    "Total Invested": 2100,
                    "Latest PSS": 6.94
                }),
            ),
            make_record(
                "rec2",
                json!({
                    "Investor Name": "John Roe",
                    "Security": "Acme",
                    "Units Held": 10,
                    "Total Invested": 100,
                    "Latest PSS": 8
                }),
            ),
            make_record(
                "rec3",
                json!({
                    "Investor Name": "Jane Doe",
                    "Security": "Acme",
                    "Units Held": 500,
                    "Issue Price / Unit": 2,
                    "Total Invested": 1000,
                    "Latest PSS": 1.8
                }),
            ),
        ]))
    }

    mod portfolio_service {
        use super::*;

        #[tokio::test]
        async fn builds_view_for_one_investor() {
            let service = PortfolioService::new(seeded_store());

            let view = service.get_portfolio("Jane Doe").await.unwrap();

            assert_eq!(view.investor, "Jane Doe");
            assert_eq!(view.holdings.len(), 2);
            assert_eq!(view.totals.total_invested, dec!(3100));
            assert_eq!(view.totals.total_current_value, dec!(10616.00));
            assert_eq!(view.holdings[1].multiple, dec!(0.9));
        }

        #[tokio::test]
        async fn unknown_investor_is_not_found() {
            let service = PortfolioService::new(seeded_store());

            let err = service.get_portfolio("Nobody").await.unwrap_err();

            assert!(matches!(err, AppError::NotFoundError(_)));
        }

        #[tokio::test]
        async fn blank_investor_is_rejected() {
            let service = PortfolioService::new(seeded_store());
            let err = service.get_portfolio("  ").await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        #[tokio::test]
        async fn lists_investors_once_each() {
            let service = PortfolioService::new(seeded_store());

            let investors = service.list_investors().await.unwrap();

            assert_eq!(investors, vec!["Jane Doe", "John Roe"]);
        }
    }

    mod admin_service {
        use super::*;

        fn admin(store: Arc<InMemoryStore>) -> AdminService {
            AdminService::new(store, "https://dash.example.com".to_string())
        }

        #[tokio::test]
        async fn lists_records_as_admin_view() {
            let service = admin(seeded_store());

            let records = service.list_records().await.unwrap();

            assert_eq!(records.len(), 3);
            assert_eq!(records[0].security.as_deref(), Some("Laundry Sauce"));
            assert_eq!(records[1].latest_pss, Some(dec!(8)));
        }

        #[tokio::test]
        async fn create_then_read_back_through_portfolio() {
            let store = seeded_store();
            let service = admin(store.clone());

            let created = service
                .create_record(RecordInput {
                    investor_name: Some("Ann Lee".into()),
                    security: Some("Widget Co".into()),
                    units_held: Some("100".into()),
                    total_invested: Some("250".into()),
                    latest_pss: Some("3".into()),
                    funding_rounds: Some("Seed: 0.55, Series A: 2.5".into()),
                    ..Default::default()
                })
                .await
                .unwrap();

            assert_eq!(created.investor_name.as_deref(), Some("Ann Lee"));

            let view = PortfolioService::new(store)
                .get_portfolio("Ann Lee")
                .await
                .unwrap();
            assert_eq!(view.holdings[0].holding.funding_rounds.len(), 2);
            assert_eq!(view.holdings[0].gain_loss, dec!(50));
            assert_eq!(view.holdings[0].gain_loss_percent, dec!(20));
        }

        #[tokio::test]
        async fn invalid_create_never_reaches_the_store() {
            let store = seeded_store();
            let service = admin(store.clone());

            let err = service
                .create_record(RecordInput {
                    investor_name: Some("Ann Lee".into()),
                    units_held: Some("many".into()),
                    ..Default::default()
                })
                .await
                .unwrap_err();

            assert!(matches!(err, AppError::ValidationError(_)));
            assert_eq!(store.snapshot().len(), 3);
        }

        #[tokio::test]
        async fn update_changes_only_sent_fields() {
            let store = seeded_store();
            let service = admin(store.clone());

            let updated = service
                .update_record(
                    "rec2",
                    RecordInput {
                        latest_pss: Some("9.5".into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();

            assert_eq!(updated.latest_pss, Some(dec!(9.5)));
            assert_eq!(updated.security.as_deref(), Some("Acme"));
        }

        #[tokio::test]
        async fn empty_update_is_rejected() {
            let service = admin(seeded_store());
            let err = service
                .update_record("rec1", RecordInput::default())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        #[tokio::test]
        async fn delete_removes_record() {
            let store = seeded_store();
            let service = admin(store.clone());

            service.delete_record("rec2").await.unwrap();

            assert_eq!(store.snapshot().len(), 2);
            assert!(service.delete_record("rec2").await.is_err());
        }

        #[test]
        fn embed_code_for_investor() {
            let service = admin(seeded_store());

            let snippet = service.embed_code("Jane Doe").unwrap();

            assert_eq!(snippet.url, "https://dash.example.com/Jane%20Doe");
            assert!(snippet.embed_code.contains("height=\"800\""));
        }
    }

    mod document_service {
        use super::*;

        fn listing() -> Arc<StaticListing> {
            let file = |id: &str, name: &str, size: u64, day: u32| FileDescriptor {
                id: id.to_string(),
                name: name.to_string(),
                size: Some(size),
                mime_type: "application/pdf".to_string(),
                modified_time: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
                url: format!("https://drive.example.com/{}", id),
            };

            let mut folders = HashMap::new();
            folders.insert(
                "folder1".to_string(),
                vec![
                    file("f1", "Zeta.pdf", 10, 1),
                    file("f2", "alpha.pdf", 3000, 2),
                ],
            );
            Arc::new(StaticListing { folders })
        }

        fn service() -> DocumentService {
            DocumentService::new(listing(), "https://dash.example.com".to_string())
        }

        #[tokio::test]
        async fn lists_sorted_by_name_by_default() {
            let docs = service()
                .list_documents(Some("folder1"), None)
                .await
                .unwrap();

            assert_eq!(docs[0].file.name, "alpha.pdf");
            assert_eq!(docs[0].size_label, "2.9 KB");
            assert_eq!(docs[1].file.name, "Zeta.pdf");
        }

        #[tokio::test]
        async fn honours_requested_sort() {
            let docs = service()
                .list_documents(Some("folder1"), Some("modified-desc"))
                .await
                .unwrap();

            assert_eq!(docs[0].file.id, "f2");
        }

        #[tokio::test]
        async fn missing_folder_is_rejected() {
            let err = service().list_documents(None, None).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(msg) if msg.contains("folder")));
        }

        #[tokio::test]
        async fn bad_sort_is_rejected_before_listing() {
            let err = service()
                .list_documents(Some("unknown"), Some("biggest"))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        #[test]
        fn doc_center_requires_both_fields() {
            let err = service()
                .create_doc_center(CreateDocCenter {
                    investor_name: Some("Jane".into()),
                    folder_id: None,
                })
                .unwrap_err();
            assert!(
                matches!(err, AppError::ValidationError(msg) if msg == "investorName and folderId are required")
            );
        }

        #[test]
        fn doc_center_link_uses_site_url() {
            let link = service()
                .create_doc_center(CreateDocCenter {
                    investor_name: Some("Jane Doe".into()),
                    folder_id: Some("abc123".into()),
                })
                .unwrap();
            assert_eq!(
                link.url,
                "https://dash.example.com/docs/jane-doe?folderId=abc123"
            );
        }
    }
}
