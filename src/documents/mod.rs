//! Document center: folder listings, sorting and shareable links.


use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::error::AppError;
use crate::repository::FileListing;
use crate::schemas::{DocCenterLink, DocumentView, FileDescriptor, FileKind};

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
// Drive's own thumbnail endpoint. The `drive-thumnails.googleusercontent.com`
// host is misspelled and does not resolve.
const THUMBNAIL_BASE_URL: &str = "https://drive.google.com/thumbnail";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Size,
    Modified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl FromStr for SortOrder {
    type Err = AppError;

    /// Parses `"<name|size|modified>-<asc|desc>"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::ValidationError(format!("Unknown sort order: {}", s));

        let (field, direction) = s.trim().split_once('-').ok_or_else(invalid)?;
        let field = match field {
            "name" => SortField::Name,
            "size" => SortField::Size,
            "modified" => SortField::Modified,
            _ => return Err(invalid()),
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid()),
        };

        Ok(Self { field, direction })
    }
}

/// Stable sort; ties keep their listing order in both directions.
pub fn sort_files(files: &mut [FileDescriptor], order: SortOrder) {
    files.sort_by(|a, b| {
        let ordering = match order.field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Size => a.size.unwrap_or(0).cmp(&b.size.unwrap_or(0)),
            SortField::Modified => a.modified_time.cmp(&b.modified_time),
        };
        match order.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Human-readable size with one decimal, e.g. `"1.5 KB"`, `"3 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

pub fn file_kind(mime_type: &str) -> FileKind {
    let mime = mime_type.to_ascii_lowercase();
    let checks = [
        ("image", FileKind::Image),
        ("video", FileKind::Video),
        ("audio", FileKind::Audio),
        ("pdf", FileKind::Pdf),
        ("sheet", FileKind::Spreadsheet),
        ("document", FileKind::Document),
        ("presentation", FileKind::Presentation),
    ];

    checks
        .iter()
        .find(|(needle, _)| mime.contains(needle))
        .map(|(_, kind)| *kind)
        .unwrap_or(FileKind::Other)
}

pub fn thumbnail_url(file: &FileDescriptor) -> Option<String> {
    match file_kind(&file.mime_type) {
        FileKind::Image | FileKind::Video => {
            Some(format!("{}?id={}&sz=w160-h120", THUMBNAIL_BASE_URL, file.id))
        }
        _ => None,
    }
}

pub fn document_view(file: FileDescriptor) -> DocumentView {
    let size_label = match file.size {
        Some(bytes) if bytes > 0 => format_file_size(bytes),
        _ => "N/A".to_string(),
    };

    DocumentView {
        size_label,
        kind: file_kind(&file.mime_type),
        thumbnail_url: thumbnail_url(&file),
        file,
    }
}

/// Lowercases and replaces everything outside `[a-z0-9]` with `-`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Validated site root without a trailing slash.
fn site_root(site: &str) -> Result<&str, AppError> {
    let url = Url::parse(site)
        .map_err(|e| AppError::InternalServerError(format!("Invalid SITE_URL {}: {}", site, e)))?;
    if url.cannot_be_a_base() {
        return Err(AppError::InternalServerError(format!(
            "SITE_URL cannot be a base: {}",
            site
        )));
    }
    Ok(site.trim_end_matches('/'))
}

pub fn doc_center_link(
    site: &str,
    investor_name: &str,
    folder_id: &str,
) -> Result<DocCenterLink, AppError> {
    let url = format!(
        "{}/docs/{}?folderId={}",
        site_root(site)?,
        slugify(investor_name),
        urlencoding::encode(folder_id)
    );

    let embed_code = format!(
        r#"<iframe src="{}" style="width:100%;height:800px;border:none;"></iframe>"#,
        url
    );

    Ok(DocCenterLink { url, embed_code })
}

/// Dashboard URL and iframe snippet for one investor. The name is encoded as a
/// single path component, so `&`, `+` and `/` never leak into the URL.
pub fn dashboard_embed(site: &str, investor_name: &str) -> Result<(String, String), AppError> {
    let url = format!(
        "{}/{}",
        site_root(site)?,
        urlencoding::encode(investor_name)
    );

    let embed_code = format!(
        r#"<iframe src="{}" width="100%" height="800" frameborder="0" style="border:none;"></iframe>"#,
        url
    );

    Ok((url, embed_code))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingPayload {
    Files(Vec<FileDescriptor>),
    Failure { error: String },
}

/// Client for the folder listing web endpoint (`GET {url}?folderId=...`).
pub struct ListingClient {
    http: reqwest::Client,
    url: Option<String>,
}

impl ListingClient {
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }
}

#[async_trait]
impl FileListing for ListingClient {
    async fn list_files(&self, folder_id: &str) -> Result<Vec<FileDescriptor>, AppError> {
        let url = self.url.as_deref().ok_or_else(|| {
            AppError::MissingCredentials(
                "Missing document listing URL: DOC_LISTING_URL".to_string(),
            )
        })?;

        let response = self
            .http
            .get(url)
            .query(&[("folderId", folder_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamError(format!(
                "Document listing error: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            )));
        }

        match response.json::<ListingPayload>().await? {
            ListingPayload::Files(files) => {
                tracing::debug!(folder_id, count = files.len(), "listed folder");
                Ok(files)
            }
            ListingPayload::Failure { error } => Err(AppError::UpstreamError(format!(
                "Document listing error: {}",
                error
            ))),
        }
    }
}
