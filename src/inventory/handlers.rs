use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{AnalyzeResponse, DeleteItemQuery, DeleteItemResponse, InventoryResponse};
use super::{repo, services};
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
    vision::{VisionExtractor, FOOD_ITEMS_PROMPT},
};

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(get_inventory))
        .route("/inventory/items", delete(delete_item))
        .route(
            "/inventory/analyze",
            post(analyze_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
}

#[instrument(skip(state))]
pub async fn get_inventory(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<InventoryResponse>> {
    let items = repo::load(&state.db, user_id).await?.unwrap_or_default();
    Ok(Json(items.into()))
}

/// POST /inventory/analyze (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn analyze_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> AppResult<Json<AnalyzeResponse>> {
    let mut image: Option<(Bytes, String)> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        if field.name() == Some("image") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "image/jpeg".into());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            image = Some((data, content_type));
        }
    }

    let text = describe_image(state.vision.as_ref(), user_id, image).await?;

    let added = services::record_extraction(&state.db, user_id, &text).await?;

    Ok(Json(AnalyzeResponse {
        items: text,
        added,
        message: "Item has been recorded".into(),
    }))
}

/// Runs the uploaded image through vision. No image, or an empty one, is a
/// client error; a vision failure is an upstream error.
async fn describe_image(
    vision: &dyn VisionExtractor,
    user_id: Uuid,
    image: Option<(Bytes, String)>,
) -> AppResult<String> {
    let Some((data, content_type)) = image.filter(|(data, _)| !data.is_empty()) else {
        warn!(%user_id, "analyze without image");
        return Err(AppError::validation("Please upload an image file."));
    };

    vision
        .analyze(data, &content_type, FOOD_ITEMS_PROMPT)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "image analysis failed");
            AppError::upstream("Image analysis failed.", e)
        })
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DeleteItemQuery>,
) -> AppResult<Json<DeleteItemResponse>> {
    let Some(item) = query.item.filter(|i| !i.trim().is_empty()) else {
        return Err(AppError::validation("Item name is required"));
    };

    match services::delete_item(&state.db, user_id, &item).await? {
        Some(removed) => {
            info!(%user_id, %item, removed, "delete item done");
            Ok(Json(DeleteItemResponse {
                message: "Item deleted successfully".into(),
                removed,
            }))
        }
        None => Err(AppError::NotFound("Inventory not found".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fakes::{FailingVision, FixedVision};
    use axum::http::StatusCode;

    fn jpeg(bytes: &'static [u8]) -> Option<(Bytes, String)> {
        Some((Bytes::from_static(bytes), "image/jpeg".into()))
    }

    #[tokio::test]
    async fn describe_image_returns_vision_text() {
        let vision = FixedVision("apple, banana".into());
        let text = describe_image(&vision, Uuid::new_v4(), jpeg(b"\xff\xd8"))
            .await
            .unwrap();
        assert_eq!(text, "apple, banana");
    }

    #[tokio::test]
    async fn missing_or_empty_image_is_rejected() {
        let vision = FixedVision("apple".into());
        for image in [None, jpeg(b"")] {
            let err = describe_image(&vision, Uuid::new_v4(), image)
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert_eq!(err.to_string(), "Please upload an image file.");
        }
    }

    #[tokio::test]
    async fn vision_failure_is_a_bad_gateway_with_details() {
        let err = describe_image(&FailingVision, Uuid::new_v4(), jpeg(b"\xff\xd8"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        match err {
            AppError::Upstream { context, details } => {
                assert_eq!(context, "Image analysis failed.");
                assert!(details.contains("quota"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_without_item_is_rejected() {
        for item in [None, Some("   ".to_string())] {
            let err = delete_item(
                State(AppState::fake()),
                AuthUser(Uuid::new_v4()),
                Query(DeleteItemQuery { item }),
            )
            .await
            .unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert_eq!(err.to_string(), "Item name is required");
        }
    }

    #[test]
    fn inventory_response_wraps_names() {
        let resp: InventoryResponse = vec!["egg".to_string(), "milk".to_string()].into();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["items"][0]["name"], "egg");
        assert_eq!(json["items"][1]["name"], "milk");
    }

    #[test]
    fn missing_inventory_reads_as_empty() {
        let resp: InventoryResponse = Vec::<String>::new().into();
        assert!(resp.items.is_empty());
    }
}
