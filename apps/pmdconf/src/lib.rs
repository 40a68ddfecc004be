//! pmdconf core library.
//!
//! This crate manages per-project static-analysis configuration: which rules
//! apply to a project, where the rule definitions live, and how a project's
//! rule-set follows the global rule-set.
//!
//! High-level modules:
//! - `models`: Rules, rule-sets, and the project properties record.
//! - `catalog`: Loading rule catalogs from rule-set files.
//! - `merge`: Override-by-name merge of several rule-set files.
//! - `sync`: Synchronization of a project rule-set with the global one.
//! - `codec`: Persisted document form of project properties.
//! - `store`: Cache of project properties with load/store/remove.
//! - `storage`: Document storage and the analysis capability flag.
//! - `global`: Providers of the global rule-set.
//! - `resolve`: Resolution of rule-set file references to paths.
//! - `review`: Background review command over an external analyzer.
//! - `config`: Discovery and effective configuration resolution.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `output`: Human/JSON printers.
//! - `utils`: Supporting helpers.
pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod global;
pub mod merge;
pub mod models;
pub mod output;
pub mod resolve;
pub mod review;
pub mod storage;
pub mod store;
pub mod sync;
pub mod utils;
