//! Direct sighting submission
//!
//! `POST /report` takes multipart/form-data with an optional photo. The photo
//! is written to the upload directory before the row is inserted and removed
//! again if the insert fails.

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tick_common::db::{insert_sighting, NewSighting, SourceLabel};
use tick_common::time::{parse_date, parse_time_of_day};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const ALLOWED_IMAGE_TYPES: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ANONYMOUS_REPORTER: &str = "Anonymous";

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub success: bool,
    pub message: String,
    pub id: String,
}

#[derive(Debug, Default)]
struct ReportForm {
    date: Option<String>,
    time: Option<String>,
    location: Option<String>,
    category: Option<String>,
    reporter: Option<String>,
    image: Option<ImageUpload>,
}

#[derive(Debug)]
struct ImageUpload {
    extension: String,
    bytes: Vec<u8>,
}

/// POST /report
pub async fn submit_report(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ReportResponse>)> {
    let mut form = ReportForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "date" => form.date = Some(text(field).await?),
            "time" => form.time = Some(text(field).await?),
            "location" => form.location = Some(text(field).await?),
            "category" | "species" => form.category = Some(text(field).await?),
            "reporter" | "reported_by" => form.reporter = Some(text(field).await?),
            "image" => form.image = read_image(field).await?,
            _ => {}
        }
    }

    let date = parse_date("date", &required(form.date, "date")?)?;
    let time = parse_time_of_day(&required(form.time, "time")?)?;
    let location = required(form.location, "location")?;
    let category = required(form.category, "category")?;
    let reporter = form
        .reporter
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| ANONYMOUS_REPORTER.to_string());

    let id = Uuid::new_v4().simple().to_string();
    let stored_image = match form.image {
        Some(image) => Some(store_image(&state.upload_dir, image).await?),
        None => None,
    };

    let sighting = NewSighting::new(
        id.clone(),
        date.and_time(time),
        location,
        Some(category),
        None,
        &state.cities,
        SourceLabel::Reporter(reporter),
    )
    .with_attachment(stored_image.as_ref().map(|(name, _)| name.clone()));

    if let Err(e) = insert_sighting(&state.db, &sighting).await {
        if let Some((_, path)) = &stored_image {
            if let Err(remove_err) = tokio::fs::remove_file(path).await {
                warn!(path = %path.display(), error = %remove_err, "Failed to remove orphaned upload");
            }
        }
        return Err(e.into());
    }

    info!(id = %id, location = %sighting.location, "Recorded submitted sighting");
    Ok((
        StatusCode::CREATED,
        Json(ReportResponse {
            success: true,
            message: "Sighting recorded - thank you!".to_string(),
            id,
        }),
    ))
}

async fn text(field: Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed form field: {}", e)))
}

/// Read the image part; an empty file input counts as no image
async fn read_image(field: Field<'_>) -> ApiResult<Option<ImageUpload>> {
    let Some(file_name) = field.file_name().map(str::to_string).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    let extension = image_extension(&file_name).ok_or_else(|| {
        ApiError::BadRequest("Image must be png, jpg, jpeg, gif, or webp".to_string())
    })?;

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed image upload: {}", e)))?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::BadRequest("Image must be under 5MB".to_string()));
    }

    Ok(Some(ImageUpload {
        extension,
        bytes: bytes.to_vec(),
    }))
}

/// Lowercased extension when it is an accepted image type
pub fn image_extension(file_name: &str) -> Option<String> {
    let ext = file_name.rsplit('.').next()?.to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES.contains(&ext.as_str()).then_some(ext)
}

async fn store_image(upload_dir: &Path, image: ImageUpload) -> ApiResult<(String, PathBuf)> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let name = format!("{}.{}", Uuid::new_v4().simple(), image.extension);
    let path = upload_dir.join(&name);
    tokio::fs::write(&path, &image.bytes).await?;
    Ok((name, path))
}

fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("tick.PNG").as_deref(), Some("png"));
        assert_eq!(image_extension("a.b.jpeg").as_deref(), Some("jpeg"));
        assert_eq!(image_extension("photo.webp").as_deref(), Some("webp"));
        assert_eq!(image_extension("notes.txt"), None);
        assert_eq!(image_extension("png"), Some("png".to_string()));
        assert_eq!(image_extension("archive.tar.gz"), None);
    }

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(Some(" Leeds ".into()), "location").unwrap(), "Leeds");
        assert!(required(Some("  ".into()), "location").is_err());
        assert!(required(None, "location").is_err());
    }
}
