//! # Gateway HTTP Module
//!
//! JSON endpoints over the ClassSel schema. Each handler builds a statement
//! and a parameter mapping, runs it through the query executor off the async
//! runtime, and serializes the plain rows it gets back.
//!
//! # Endpoints
//!
//! - `/student/*`, `/student_image`, `/student_no_assistance` - Students
//! - `/program/*`, `/docent/*`, `/programs_by_institution`, `/programas/*`,
//!   `/configuracion_programa/*` - Programs
//! - `/preguntas`, `/respuestas`, `/guardar_respuesta` - Questionnaires
//! - `/event` - Event log
//! - `/health`, `/metrics` - Observability
//!
//! Every endpoint is also reachable under the configured path prefix.

pub mod config;
pub mod errors;
pub mod event_routes;
pub mod input;
pub mod observability_routes;
pub mod program_routes;
pub mod questionnaire_routes;
pub mod server;
pub mod state;
pub mod statements;
pub mod student_routes;

pub use config::HttpServerConfig;
pub use errors::{GatewayError, GatewayResult};
pub use server::GatewayServer;
pub use state::{Clock, GatewayState};
