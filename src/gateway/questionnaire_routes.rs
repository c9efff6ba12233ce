//! Questionnaire HTTP Routes
//!
//! Program questions, their answer options, and submitted answers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::GatewayResult;
use super::input::{id_param, required, scalar_param};
use super::state::GatewayState;
use super::statements;
use crate::db::{ColumnValue, Params, PlainRow};

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct QuestionsQuery {
    pub id_institucion: Option<String>,
    pub id_programa: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswersQuery {
    pub id_institucion: Option<String>,
    pub id_programa: Option<String>,
    pub id_pregunta: Option<String>,
}

/// A program question as sent to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    #[serde(rename = "ID_PROGRAMA_PREGUNTA")]
    pub id: ColumnValue,
    #[serde(rename = "pregunta_descripcion")]
    pub description: ColumnValue,
    #[serde(rename = "tipo_pregunta")]
    pub kind: ColumnValue,
    /// Base64 image, `null` when the question has none
    #[serde(rename = "pregunta_imagen")]
    pub image: Option<String>,
}

impl Question {
    /// Build from a `statements::QUESTIONS` row
    pub fn from_row(row: PlainRow) -> Self {
        let mut values = row.into_values().into_iter();
        let mut next = || values.next().unwrap_or(ColumnValue::Null);
        let id = next();
        let description = next();
        let kind = next();
        let image = next().to_base64();
        Self {
            id,
            description,
            kind,
            image,
        }
    }
}

/// Submitted answer record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AnswerRequest {
    pub id_institucion: Value,
    pub id_programa: Value,
    pub id_alumno: Value,
    pub id_pregunta: Value,
    pub tipo_pregunta: Value,
    pub respuesta: Value,
    pub respuestas_multiples: Value,
    pub pregunta_descripcion: Value,
    pub calificacion_alumno: Value,
    pub calificacion_pregunta: Value,
}

impl AnswerRequest {
    fn params(&self) -> GatewayResult<Params> {
        let fields = [
            ("ID_INSTITUCION", &self.id_institucion),
            ("ID_PROGRAMA", &self.id_programa),
            ("ID_ALUMNO", &self.id_alumno),
            ("ID_PREGUNTA", &self.id_pregunta),
            ("TIPO_PREGUNTA", &self.tipo_pregunta),
            ("RESPUESTA", &self.respuesta),
            ("RESPUESTAS_MULTIPLES", &self.respuestas_multiples),
            ("PREGUNTA_DESCRIPCION", &self.pregunta_descripcion),
            ("CALIFICACION_ALUMNO", &self.calificacion_alumno),
            ("CALIFICACION_PREGUNTA", &self.calificacion_pregunta),
        ];
        fields
            .iter()
            .try_fold(Params::new(), |params, (name, value)| {
                Ok(params.bind(name, scalar_param(name, value)?))
            })
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================
// Questionnaire Routes
// ==================

/// Create questionnaire routes
pub fn questionnaire_routes(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/preguntas", get(list_questions_handler))
        .route("/respuestas", get(list_answers_handler))
        .route("/guardar_respuesta", post(save_answer_handler))
        .with_state(state)
}

async fn list_questions_handler(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<QuestionsQuery>,
) -> GatewayResult<Json<Vec<Question>>> {
    let params = Params::new()
        .bind("id_institucion", id_param(required("id_institucion", &query.id_institucion)?))
        .bind("id_programa", id_param(required("id_programa", &query.id_programa)?));

    let rows = state
        .executor
        .run(move |db| db.fetch_all(statements::QUESTIONS, &params))
        .await?;
    Ok(Json(rows.into_iter().map(Question::from_row).collect()))
}

async fn list_answers_handler(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<AnswersQuery>,
) -> GatewayResult<Json<Vec<PlainRow>>> {
    let params = Params::new()
        .bind("id_institucion", id_param(required("id_institucion", &query.id_institucion)?))
        .bind("id_programa", id_param(required("id_programa", &query.id_programa)?))
        .bind("id_pregunta", id_param(required("id_pregunta", &query.id_pregunta)?));

    let rows = state
        .executor
        .run(move |db| db.fetch_all(statements::ANSWERS, &params))
        .await?;
    Ok(Json(rows))
}

async fn save_answer_handler(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<AnswerRequest>,
) -> GatewayResult<(StatusCode, Json<MessageResponse>)> {
    let params = request.params()?;
    state
        .executor
        .run(move |db| db.execute_write(statements::INSERT_ANSWER, &params))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Respuesta guardada correctamente".to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_question_from_row_encodes_image() {
        let row = PlainRow::new(vec![
            ColumnValue::Integer(3),
            ColumnValue::Text("¿Capital de Chile?".into()),
            ColumnValue::Text("UNICA".into()),
            ColumnValue::Binary(b"\x89PNG\r\n".to_vec()),
        ]);
        let question = Question::from_row(row);
        assert_eq!(
            serde_json::to_value(&question).unwrap(),
            json!({
                "ID_PROGRAMA_PREGUNTA": 3,
                "pregunta_descripcion": "¿Capital de Chile?",
                "tipo_pregunta": "UNICA",
                "pregunta_imagen": "iVBORw0K"
            })
        );
    }

    #[test]
    fn test_question_without_image() {
        let row = PlainRow::new(vec![
            ColumnValue::Integer(4),
            ColumnValue::Text("2+2".into()),
            ColumnValue::Text("MULTIPLE".into()),
            ColumnValue::Null,
        ]);
        assert_eq!(Question::from_row(row).image, None);
    }

    #[test]
    fn test_answer_params_bind_all_fields() {
        let request: AnswerRequest = serde_json::from_value(json!({
            "ID_INSTITUCION": 5,
            "ID_PROGRAMA": 9,
            "ID_ALUMNO": 100,
            "ID_PREGUNTA": 3,
            "TIPO_PREGUNTA": "UNICA",
            "RESPUESTA": "Santiago",
            "RESPUESTAS_MULTIPLES": null,
            "PREGUNTA_DESCRIPCION": "¿Capital de Chile?",
            "CALIFICACION_ALUMNO": 1.0,
            "CALIFICACION_PREGUNTA": 1
        }))
        .unwrap();

        let params = request.params().unwrap();
        assert_eq!(params.len(), 10);
        assert!(params.duplicate().is_none());
    }

    #[test]
    fn test_answer_params_reject_nested_values() {
        let request: AnswerRequest = serde_json::from_value(json!({
            "ID_INSTITUCION": 5,
            "ID_PROGRAMA": 9,
            "ID_ALUMNO": 100,
            "ID_PREGUNTA": 3,
            "TIPO_PREGUNTA": "MULTIPLE",
            "RESPUESTA": null,
            "RESPUESTAS_MULTIPLES": ["a", "b"],
            "PREGUNTA_DESCRIPCION": "x",
            "CALIFICACION_ALUMNO": 0,
            "CALIFICACION_PREGUNTA": 1
        }))
        .unwrap();

        assert!(request.params().is_err());
    }
}
