//! classsel-gateway - JSON over HTTP for the ClassSel relational schema
//!
//! Requests become named-parameter SQL statements, run through a stateless
//! query executor, and come back as plain JSON rows.

pub mod cli;
pub mod db;
pub mod gateway;
pub mod observability;
pub mod timestamp;
