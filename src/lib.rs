//! # Claridad: Experiment Aggregation & Correlation Engine
//!
//! Claridad ingests flat per-trial experiment records (one row per
//! generated text sample, annotated with a condition, a target length,
//! a consistency score, and readability metrics) and produces grouped
//! summary statistics and inter-metric Pearson correlations used to
//! evaluate a length/accuracy/readability tradeoff.
//!
//! ## Design
//!
//! - **Missing is a value**: metric cells are `Option<f64>`; every
//!   numeric edge case (missing metric, zero variance, zero-target
//!   division, below-threshold sample) resolves to missing, never an
//!   error or a NaN.
//! - **Deterministic partitions**: grouping keys are typed tuples with
//!   a total order, so report row order is reproducible across runs.
//! - **Pure runs**: one run is a function of (dataset, configuration);
//!   no state carries across runs.
//!
//! ## Example
//!
//! ```rust
//! use claridad::config::AnalysisConfig;
//! use claridad::dataset::{Dataset, FieldValue};
//! use claridad::pipeline;
//!
//! let dataset = Dataset::builder()
//!     .key_column(
//!         "TargetLength",
//!         vec![FieldValue::Int(50), FieldValue::Int(50), FieldValue::Int(100)],
//!     )
//!     .metric_column("NLI_AverageScore", vec![Some(0.82), None, Some(0.77)])
//!     .build()?;
//!
//! let config = AnalysisConfig::new()
//!     .grouping_key("TargetLength")
//!     .metric("NLI_AverageScore");
//!
//! let reports = pipeline::run(&dataset, &config)?;
//! assert!(reports.table("overall").is_some());
//! # Ok::<(), claridad::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod corr;
pub mod dataset;
pub mod derived;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use error::{Error, Result};
