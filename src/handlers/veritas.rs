//! Veritas analysis handlers

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};

use crate::{AppState, AppError, AppResult};
use crate::logic::features::{calculate_features, FeatureError};
use crate::logic::table::FileType;
use crate::middleware::auth::UserContext;
use crate::models::AuthenticityResult;

/// Multipart field carrying the dataset
const FILE_FIELD: &str = "file";

/// Score an uploaded dataset file
pub async fn analyze_file(
    State(state): State<AppState>,
    user: UserContext,
    mut multipart: Multipart,
) -> AppResult<Json<AuthenticityResult>> {
    let (file_type, contents) = read_upload(&mut multipart).await?;
    let size = contents.len();

    // Parsing and inference are CPU bound
    let scorer = state.scorer.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<f64, FeatureError> {
        let features = calculate_features(&contents, file_type)?;
        Ok(scorer.predict(&features))
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Analysis task failed: {}", e)))?;

    let synthetic_probability = outcome.map_err(|e| AppError::Unprocessable(e.error))?;
    let result = AuthenticityResult::from_probability(synthetic_probability);

    tracing::info!(
        "Veritas analysis {} for {}: {} bytes of {}, score {}",
        result.request_id,
        user.subject,
        size,
        file_type.as_str(),
        result.authenticity_score
    );

    Ok(Json(result))
}

async fn read_upload(multipart: &mut Multipart) -> AppResult<(FileType, Bytes)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_type = field
            .content_type()
            .and_then(FileType::from_content_type)
            .ok_or(AppError::UnsupportedFileType)?;

        let contents = field.bytes().await?;
        return Ok((file_type, contents));
    }

    Err(AppError::ValidationError(format!("Missing '{}' field in upload", FILE_FIELD)))
}
