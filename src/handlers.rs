use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::AppState;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::schemas::{
    AdminRecord, CreateDocCenter, DocCenterLink, DocumentQuery, DocumentView, EmbedSnippet,
    PortfolioView, RecordId, RecordInput,
};

// --- Portfolio Handlers ---

pub async fn list_investors(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let investors = state.portfolio_service().list_investors().await?;
    Ok(Json(ApiResponse::data(investors)))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(investor): Path<String>,
) -> Result<Json<ApiResponse<PortfolioView>>, AppError> {
    let view = state.portfolio_service().get_portfolio(&investor).await?;
    Ok(Json(ApiResponse::data(view)))
}

// --- Admin Handlers ---

pub async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AdminRecord>>>, AppError> {
    let records = state.admin_service().list_records().await?;
    Ok(Json(ApiResponse::data(records)))
}

pub async fn create_record(
    State(state): State<AppState>,
    Json(payload): Json<RecordInput>,
) -> Result<Json<ApiResponse<AdminRecord>>, AppError> {
    let record = state.admin_service().create_record(payload).await?;
    Ok(Json(ApiResponse::success(
        record,
        Some("Record created".to_string()),
    )))
}

pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RecordInput>,
) -> Result<Json<ApiResponse<AdminRecord>>, AppError> {
    let record = state.admin_service().update_record(&id, payload).await?;
    Ok(Json(ApiResponse::success(
        record,
        Some("Record updated".to_string()),
    )))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RecordId>>, AppError> {
    state.admin_service().delete_record(&id).await?;
    Ok(Json(ApiResponse::success(
        RecordId { id },
        Some("Record deleted".to_string()),
    )))
}

pub async fn get_embed_code(
    State(state): State<AppState>,
    Path(investor): Path<String>,
) -> Result<Json<ApiResponse<EmbedSnippet>>, AppError> {
    let snippet = state.admin_service().embed_code(&investor)?;
    Ok(Json(ApiResponse::data(snippet)))
}

// --- Document Center Handlers ---

pub async fn create_doc_center(
    State(state): State<AppState>,
    Json(payload): Json<CreateDocCenter>,
) -> Result<Json<ApiResponse<DocCenterLink>>, AppError> {
    let link = state.document_service().create_doc_center(payload)?;
    Ok(Json(ApiResponse::data(link)))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<DocumentQuery>,
) -> Result<Json<ApiResponse<Vec<DocumentView>>>, AppError> {
    tracing::debug!(name = %name, "listing document center");
    let documents = state
        .document_service()
        .list_documents(params.folder_id.as_deref(), params.sort.as_deref())
        .await?;
    Ok(Json(ApiResponse::data(documents)))
}
