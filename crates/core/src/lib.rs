//! # Hastane Core
//!
//! Core data operations for the hastane hospital administration backend.
//!
//! This crate contains everything between an HTTP request and the database:
//! - The closed route table ([`Route`]) over entity × operation pairs and report routes
//! - The statement registry: one parameterized SQL template per route
//! - Form value normalization into positional parameters
//! - Typed row records and the PostgreSQL query executor
//! - Startup configuration
//!
//! **No HTTP concerns**: routing, views and rendering belong in `hastane-web`.

pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod form;
pub mod routes;
pub mod rows;
pub mod statements;

pub use config::HastaneConfig;
pub use error::{HastaneError, HastaneResult};
pub use executor::{PgExecutor, QueryError, StatementExecutor};
pub use form::Param;
pub use routes::{Entity, GetBehaviour, Operation, Report, Route, LAYOUT_VIEW};
pub use rows::{RowKind, Rows};
pub use statements::Statement;
