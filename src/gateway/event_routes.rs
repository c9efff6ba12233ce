//! Event Log HTTP Routes

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::Value;

use super::errors::GatewayResult;
use super::input::{binary_param, scalar_param};
use super::state::GatewayState;
use super::statements;
use crate::db::Params;

/// Proctoring event reported by a client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EventRequest {
    pub program_id: Value,
    pub student_name: Value,
    pub lastname_student: Value,
    pub event_description: Value,
    pub time_event: Value,
    /// Base64 screenshot, may be `null`
    pub capture_test: Value,
    pub id_event: Value,
    pub notice_user: Value,
    pub institution_id: Value,
}

impl EventRequest {
    fn params(&self) -> GatewayResult<Params> {
        Ok(Params::new()
            .bind("PROGRAM_ID", scalar_param("PROGRAM_ID", &self.program_id)?)
            .bind("STUDENT_NAME", scalar_param("STUDENT_NAME", &self.student_name)?)
            .bind("LASTNAME_STUDENT", scalar_param("LASTNAME_STUDENT", &self.lastname_student)?)
            .bind("EVENT_DESCRIPTION", scalar_param("EVENT_DESCRIPTION", &self.event_description)?)
            .bind("TIME_EVENT", scalar_param("TIME_EVENT", &self.time_event)?)
            .bind("CAPTURE_TEST", binary_param("CAPTURE_TEST", &self.capture_test)?)
            .bind("ID_EVENT", scalar_param("ID_EVENT", &self.id_event)?)
            .bind("NOTICE_USER", scalar_param("NOTICE_USER", &self.notice_user)?)
            .bind("INSTITUTION_ID", scalar_param("INSTITUTION_ID", &self.institution_id)?))
    }
}

/// Create event routes
pub fn event_routes(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/event", post(save_event_handler))
        .with_state(state)
}

async fn save_event_handler(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<EventRequest>,
) -> GatewayResult<StatusCode> {
    let params = request.params()?;
    state
        .executor
        .run(move |db| db.execute_write(statements::INSERT_EVENT, &params))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ParamValue;
    use serde_json::json;

    fn event(capture: Value) -> EventRequest {
        serde_json::from_value(json!({
            "PROGRAM_ID": 9,
            "STUDENT_NAME": "Ana",
            "LASTNAME_STUDENT": "Rojas",
            "EVENT_DESCRIPTION": "Cambio de ventana",
            "TIME_EVENT": "01-06-2024 10:05:00 AM",
            "CAPTURE_TEST": capture,
            "ID_EVENT": 2,
            "NOTICE_USER": "Se detectó un cambio de ventana",
            "INSTITUTION_ID": 5
        }))
        .unwrap()
    }

    #[test]
    fn test_event_params() {
        let params = event(json!("iVBORw0K")).params().unwrap();
        assert_eq!(params.len(), 9);
        assert_eq!(params.get("CAPTURE_TEST"), Some(&ParamValue::Binary(b"\x89PNG\r\n".to_vec())));
        assert_eq!(params.get("TIME_EVENT"), Some(&ParamValue::Text("01-06-2024 10:05:00 AM".into())));
    }

    #[test]
    fn test_event_bad_capture() {
        assert!(event(json!("%%%")).params().is_err());
    }
}
