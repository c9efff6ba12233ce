//! Student HTTP Routes
//!
//! Student lookup, photo capture and attendance updates.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use super::errors::GatewayResult;
use super::input::{binary_param, scalar_param};
use super::state::GatewayState;
use super::statements;
use crate::db::{Params, PlainRow};

// ==================
// Request Types
// ==================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StudentImageRequest {
    /// Base64 image
    pub student_photo: Value,
    pub assistance: Value,
    pub student_id: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StudentAssistanceRequest {
    pub assistance: Value,
    pub student_id: Value,
}

// ==================
// Student Routes
// ==================

/// Create student routes
pub fn student_routes(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/student/:username", get(get_student_handler))
        .route("/student_image", post(save_student_image_handler))
        .route("/student_no_assistance", post(save_student_no_assistance_handler))
        .with_state(state)
}

async fn get_student_handler(
    State(state): State<Arc<GatewayState>>,
    Path(username): Path<String>,
) -> GatewayResult<Json<Option<PlainRow>>> {
    // Usernames stay text even when they look numeric
    let params = Params::new().bind("USUARIO", username);
    let row = state
        .executor
        .run(move |db| db.fetch_one(statements::STUDENT_BY_USERNAME, &params))
        .await?;
    Ok(Json(row))
}

async fn save_student_image_handler(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<StudentImageRequest>,
) -> GatewayResult<StatusCode> {
    let params = Params::new()
        .bind("STUDENT_PHOTO", binary_param("STUDENT_PHOTO", &request.student_photo)?)
        .bind("ASSISTANCE", scalar_param("ASSISTANCE", &request.assistance)?)
        .bind("STUDENT_ID", scalar_param("STUDENT_ID", &request.student_id)?);

    state
        .executor
        .run(move |db| db.execute_write(statements::UPDATE_STUDENT_IMAGE, &params))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn save_student_no_assistance_handler(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<StudentAssistanceRequest>,
) -> GatewayResult<StatusCode> {
    let params = Params::new()
        .bind("ASSISTANCE", scalar_param("ASSISTANCE", &request.assistance)?)
        .bind("STUDENT_ID", scalar_param("STUDENT_ID", &request.student_id)?);

    state
        .executor
        .run(move |db| db.execute_write(statements::UPDATE_STUDENT_ASSISTANCE, &params))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_request_field_names() {
        let request: StudentImageRequest = serde_json::from_value(json!({
            "STUDENT_PHOTO": "iVBORw0K",
            "ASSISTANCE": "1",
            "STUDENT_ID": 10
        }))
        .unwrap();
        assert_eq!(request.student_id, json!(10));
    }

    #[test]
    fn test_missing_field_rejected() {
        let result: Result<StudentAssistanceRequest, _> =
            serde_json::from_value(json!({"ASSISTANCE": "0"}));
        assert!(result.is_err());
    }
}
