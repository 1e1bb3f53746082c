//! # collocation-engine
//!
//! Temporal collocation for irregularly sampled time series.
//!
//! Given a reference sequence of timestamps and a time-indexed input series
//! (satellite overpasses against in-situ stations, model output against
//! observations), the engine finds for each reference timestamp the nearest
//! input observation within a symmetric tolerance window and produces an
//! aligned table — the time-synchronized pairs that downstream comparison
//! statistics require.
//!
//! Matching is deterministic (explicit tie-break rules for equidistant and
//! duplicate timestamps), quality-flag aware (valid observations first,
//! flagged ones only on explicit opt-in), and timezone-correct (series are
//! compared as instants through the timezone database, never by wall-clock
//! digits or fixed offsets).
//!
//! ## Modules
//!
//! - [`series`] — timelines, columns and series; the read-only inputs
//! - [`normalize`] — timezone normalization to UTC instants
//! - [`validity`] — quality-flag resolution into per-row validity
//! - [`matcher`] — nearest-neighbour search over a candidate pool
//! - [`collocate`] — the collocation operation and its options
//! - [`table`] — aligned output tables
//! - [`error`] — error types

pub mod collocate;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod series;
pub mod table;
pub mod validity;

pub use collocate::{collocate, collocate_with_options, CollocateOptions};
pub use error::CollocationError;
pub use matcher::{CandidateIndex, NearestMatch};
pub use series::{Column, Series, Timeline};
pub use table::{OutputColumn, OutputTable, DISTANCE_OTHER, INDEX_OTHER};
pub use validity::{FlagSource, Validity};
