use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::schemas::{FileDescriptor, RawRecord};

/// The tabular store holding one record per holding.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_records(&self) -> Result<Vec<RawRecord>, AppError>;

    async fn records_for_investor(&self, investor: &str) -> Result<Vec<RawRecord>, AppError>;

    async fn create_record(&self, fields: Map<String, Value>) -> Result<RawRecord, AppError>;

    async fn update_record(
        &self,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<RawRecord, AppError>;

    async fn delete_record(&self, id: &str) -> Result<(), AppError>;
}

/// Lists the files of a cloud-storage folder.
#[async_trait]
pub trait FileListing: Send + Sync {
    async fn list_files(&self, folder_id: &str) -> Result<Vec<FileDescriptor>, AppError>;
}
