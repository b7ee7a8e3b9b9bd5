use axum::{
    extract::{self, Path, Query, State},
    http::StatusCode,
    response::NoContent,
    Json,
};

use crate::{
    db_persistence::DbError,
    handlers::{HandlerError, SuccessResponse},
    http_server::AppState,
    models::announcement::{
        AnnouncementInput, AnnouncementQueryParams, BusinessAnnouncement, NewAnnouncement, UpdateAnnouncement,
    },
    AppError,
};

#[derive(Debug, thiserror::Error)]
pub enum AnnouncementHandlerError {
    #[error("No fields to update")]
    NoFieldsToUpdate,
}

/// GET /announcements?uen=
pub async fn handle_get_announcements(
    State(state): State<AppState>,
    Query(params): Query<AnnouncementQueryParams>,
) -> Result<Json<SuccessResponse<Vec<BusinessAnnouncement>>>, AppError> {
    let announcements = match params.uen.as_deref().map(str::trim).filter(|uen| !uen.is_empty()) {
        Some(uen) => state.db.announcements.find_all_by_business(uen).await?,
        None => state.db.announcements.find_all().await?,
    };

    Ok(SuccessResponse::new(announcements))
}

/// POST /announcements
pub async fn handle_create_announcement(
    State(state): State<AppState>,
    extract::Json(input): Json<AnnouncementInput>,
) -> Result<(StatusCode, Json<SuccessResponse<BusinessAnnouncement>>), AppError> {
    let new_announcement = NewAnnouncement::new(input)?;
    let announcement = state.db.announcements.create(&new_announcement).await?;

    tracing::info!(
        "Announcement {} posted for business {}",
        announcement.id,
        announcement.business_uen
    );

    Ok((StatusCode::CREATED, SuccessResponse::new(announcement)))
}

/// PUT /announcements/:announcement_id
pub async fn handle_update_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<i32>,
    extract::Json(updates): Json<UpdateAnnouncement>,
) -> Result<Json<SuccessResponse<BusinessAnnouncement>>, AppError> {
    if updates.is_empty() {
        return Err(AppError::Handler(HandlerError::Announcement(
            AnnouncementHandlerError::NoFieldsToUpdate,
        )));
    }
    updates.validate()?;

    let announcement = state
        .db
        .announcements
        .update(announcement_id, &updates)
        .await?
        .ok_or(DbError::AnnouncementNotFound(announcement_id))?;

    Ok(SuccessResponse::new(announcement))
}

/// DELETE /announcements/:announcement_id
pub async fn handle_delete_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<i32>,
) -> Result<NoContent, AppError> {
    if !state.db.announcements.delete(announcement_id).await? {
        return Err(AppError::Database(DbError::AnnouncementNotFound(announcement_id)));
    }

    tracing::info!("Deleted announcement {}", announcement_id);

    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{
        routes::announcement::announcement_routes,
        utils::{test_app_state::create_test_app_state, test_db::reset_database},
    };

    async fn setup() -> Router {
        let state = create_test_app_state().await;
        reset_database(&state.db.pool).await;
        announcement_routes().with_state(state)
    }

    fn request(method: &str, uri: &str, payload: Option<Value>) -> axum::http::Request<Body> {
        let builder = axum::http::Request::builder().method(method).uri(uri);
        match payload {
            Some(payload) => builder
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    async fn post(router: &Router, uen: &str, title: &str) -> i64 {
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/announcements",
                Some(json!({ "business_uen": uen, "title": title, "content": "Come by this weekend" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list_announcements() {
        let router = setup().await;
        post(&router, "53312345A", "Anniversary sale").await;
        post(&router, "201912345K", "New menu").await;

        let response = router.clone().oneshot(request("GET", "/announcements", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

        let response = router
            .clone()
            .oneshot(request("GET", "/announcements?uen=53312345A", None))
            .await
            .unwrap();
        let body = body_json(response).await;
        let scoped = body["data"].as_array().unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0]["title"], "Anniversary sale");

        let response = router
            .oneshot(request(
                "POST",
                "/announcements",
                Some(json!({ "business_uen": "", "title": "", "content": "" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_announcement() {
        let router = setup().await;
        let id = post(&router, "53312345A", "Anniversary sale").await;

        let response = router
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/announcements/{}", id),
                Some(json!({ "title": "Anniversary sale extended" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["title"], "Anniversary sale extended");
        assert_eq!(body["data"]["content"], "Come by this weekend");

        let response = router
            .clone()
            .oneshot(request("PUT", &format!("/announcements/{}", id), Some(json!({}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router
            .oneshot(request("PUT", "/announcements/9999", Some(json!({ "content": "Hello" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_announcement() {
        let router = setup().await;
        let id = post(&router, "53312345A", "Closing down").await;
        let uri = format!("/announcements/{}", id);

        let response = router.clone().oneshot(request("DELETE", &uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = router.oneshot(request("DELETE", &uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
