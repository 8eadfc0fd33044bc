//! Core business logic - framework-agnostic catalog, order, receipt, identity
//! and reporting operations.
//!
//! Every function takes a database handle explicitly. Mutations open their own
//! transaction and commit only when every step succeeded; dropping an
//! uncommitted transaction rolls it back.

/// Monthly copy of the database file
pub mod backup;
/// Idempotent startup routines
pub mod bootstrap;
/// Supervisor and cashier PIN records
pub mod identity;
/// Menu catalog management
pub mod menu;
/// Order aggregate lifecycle
pub mod order;
/// Year-scoped receipt number allocation
pub mod receipt;
/// Read-only sales reporting
pub mod report;
/// Key/value terminal settings
pub mod setting;
