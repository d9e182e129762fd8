use axum::{extract::State, response::Redirect};
use axum_extra::extract::Multipart;
use tower_cookies::{Cookies, Key};

use super::set_flash;
use crate::{error::AppError, middleware::require_full_access, models::Model};

pub const ACCEPTED_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

pub const REJECTED_MESSAGE: &str = "Please upload a PDF, DOC, or Excel file.";

/// Checks the reported content type only; the bytes are not inspected.
pub fn check_content_type(content_type: Option<&str>) -> Result<(), AppError> {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match essence {
        Some(ct) if ACCEPTED_TYPES.contains(&ct.as_str()) => Ok(()),
        _ => Err(AppError::Upload(REJECTED_MESSAGE.into())),
    }
}

struct UploadedFile {
    name: String,
    size: usize,
}

async fn read_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let bad_body = |_| AppError::Upload("The upload could not be read.".into());

    while let Some(field) = multipart.next_field().await.map_err(bad_body)? {
        if field.name() != Some("file") {
            continue;
        }

        check_content_type(field.content_type())?;
        let name = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await.map_err(bad_body)?;
        return Ok(UploadedFile {
            name,
            size: data.len(),
        });
    }

    Err(AppError::Upload("No file was attached.".into()))
}

/// Accepts a document for the portal. No parser exists for these formats, so
/// the file is acknowledged and no records are created.
pub async fn upload<M: Model>(
    State(key): State<Key>,
    cookies: Cookies,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    require_full_access(&cookies, &key, M::PORTAL)?;
    let file = read_file(multipart).await?;

    log::info!(
        "Received {} ({} bytes) for {}; no records imported",
        file.name,
        file.size,
        M::PLURAL
    );
    set_flash(
        &cookies,
        &format!(
            "Received {} ({} bytes). No records were imported.",
            file.name, file.size
        ),
    );
    Ok(Redirect::to(&format!("/{}", M::SLUG)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn office_documents_and_pdf_are_accepted() {
        for ct in ACCEPTED_TYPES {
            assert!(check_content_type(Some(ct)).is_ok());
        }
        assert!(check_content_type(Some("application/pdf; charset=binary")).is_ok());
    }

    #[test]
    fn everything_else_is_rejected() {
        for ct in [Some("image/png"), Some("text/csv"), None] {
            let err = check_content_type(ct).unwrap_err();
            assert_eq!(err.to_string(), REJECTED_MESSAGE);
        }
    }
}
