//! Bundled schema provisioning

use rusqlite::Connection;

/// DDL for every table the gateway reads or writes
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Tables created by `SCHEMA_SQL`
pub const TABLES: &[&str] = &[
    "ALUMNO",
    "REGISTRO_PROGRAMA",
    "DOCENTE",
    "BITACORA_EVENTOS",
    "PROGRAMA_CONFIGURACION",
    "PROGRAMA_PREGUNTAS",
    "PROGRAMA_RESPUESTAS",
    "SEL_PREGUNTA_UNICA_MULTIPLE",
];

/// Apply the bundled schema. Safe to run more than once.
pub fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
