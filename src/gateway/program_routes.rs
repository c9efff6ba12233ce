//! Program HTTP Routes
//!
//! Program records, instructors, configuration, and the programs of an
//! institution that are active at a given moment.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::errors::GatewayResult;
use super::input::{id_param, required, timestamp_param};
use super::state::GatewayState;
use super::statements;
use crate::db::{ParamValue, Params, PlainRow};

#[derive(Debug, Deserialize)]
pub struct ProgramsByInstitutionQuery {
    pub id_institucion: Option<String>,
    /// `DD-MM-YYYY hh:mm:ss AM/PM`
    pub fecha_actual: Option<String>,
}

/// Create program routes
pub fn program_routes(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/program/:program_id", get(get_program_handler))
        .route("/docent/:program_id", get(get_docent_handler))
        .route("/programs_by_institution", get(programs_by_institution_handler))
        .route("/configuracion_programa/:id_programa", get(program_configuration_handler))
        .route("/programas/:id_institucion", get(current_programs_handler))
        .with_state(state)
}

async fn get_program_handler(
    State(state): State<Arc<GatewayState>>,
    Path(program_id): Path<String>,
) -> GatewayResult<Json<Option<PlainRow>>> {
    let params = Params::new().bind("PROGRAM_ID", id_param(&program_id));
    let row = state
        .executor
        .run(move |db| db.fetch_one(statements::PROGRAM_BY_ID, &params))
        .await?;
    Ok(Json(row))
}

async fn get_docent_handler(
    State(state): State<Arc<GatewayState>>,
    Path(program_id): Path<String>,
) -> GatewayResult<Json<Option<PlainRow>>> {
    let params = Params::new().bind("PROGRAM_ID", id_param(&program_id));
    let row = state
        .executor
        .run(move |db| db.fetch_one(statements::DOCENT_BY_PROGRAM, &params))
        .await?;
    Ok(Json(row))
}

async fn programs_by_institution_handler(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<ProgramsByInstitutionQuery>,
) -> GatewayResult<Json<Vec<PlainRow>>> {
    let institution = id_param(required("id_institucion", &query.id_institucion)?);
    let now = timestamp_param("fecha_actual", &query.fecha_actual)?;
    active_programs(&state, institution, now).await
}

async fn current_programs_handler(
    State(state): State<Arc<GatewayState>>,
    Path(id_institucion): Path<String>,
) -> GatewayResult<Json<Vec<PlainRow>>> {
    let now = ParamValue::Date(state.now());
    active_programs(&state, id_param(&id_institucion), now).await
}

async fn active_programs(
    state: &GatewayState,
    institution: ParamValue,
    now: ParamValue,
) -> GatewayResult<Json<Vec<PlainRow>>> {
    let params = Params::new()
        .bind("id_institucion", institution)
        .bind("fecha_actual", now);
    let rows = state
        .executor
        .run(move |db| db.fetch_all(statements::ACTIVE_PROGRAMS, &params))
        .await?;
    Ok(Json(rows))
}

async fn program_configuration_handler(
    State(state): State<Arc<GatewayState>>,
    Path(id_programa): Path<String>,
) -> GatewayResult<Json<Option<PlainRow>>> {
    let params = Params::new().bind("id_programa", id_param(&id_programa));
    let row = state
        .executor
        .run(move |db| db.fetch_one(statements::PROGRAM_CONFIGURATION, &params))
        .await?;
    Ok(Json(row))
}
