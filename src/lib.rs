//! medir - Rule-based Data Quality Measurement in Pure Rust
//!
//! Binds named, unevaluated conditions, runs them against an Arrow-backed
//! tabular dataset, and reduces the per-row outcomes to measurement
//! records.
//!
//! # Design Principles
//!
//! 1. **Deferred evaluation** - conditions are explicit expression trees
//!    plus a captured scope, resolved only when a dataset is supplied
//! 2. **Tri-state semantics** - missing values are unknown markers that
//!    propagate through comparisons and Kleene and/or, never silently
//!    coerced
//! 3. **Partial failure** - one bad rule never blocks its siblings; failed
//!    rules stay visible next to measured ones
//! 4. **Ecosystem aligned** - Arrow 53, Parquet 53
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Float64Array, Int64Array};
//! use medir::{col, lit, Aggregator, DataTable, Evaluator, RuleSet};
//!
//! let cyl: ArrayRef = Arc::new(Int64Array::from(vec![6, 6, 4, 6, 8]));
//! let mpg: ArrayRef = Arc::new(Float64Array::from(vec![21.0, 21.0, 22.8, 21.4, 18.7]));
//! let table = DataTable::from_columns(vec![("cyl", cyl), ("mpg", mpg)]).unwrap();
//!
//! let mut rules = RuleSet::new();
//! rules.bind("cyl_larger_4", col("cyl").gt(lit(4))).unwrap();
//!
//! let result = Evaluator::new().evaluate(&rules, &table).unwrap();
//! let measurements = Aggregator::new()
//!     .data_id("mtcars")
//!     .aggregate(&result, &table)
//!     .unwrap();
//!
//! assert_eq!(measurements[0].value, 4.0);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp,
        clippy::redundant_clone,
        clippy::similar_names,
        clippy::unreadable_literal
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::map_unwrap_or)]

pub mod dataset;
pub mod error;
pub mod eval;
pub mod export;
pub mod expr;
pub mod measure;
pub mod rule;

// Re-exports for convenience
// Re-export arrow types commonly needed
pub use arrow::{
    array::{ArrayRef, RecordBatch},
    datatypes::{Schema, SchemaRef},
};
pub use dataset::{CsvOptions, DataTable, Dataset, JsonOptions};
pub use error::{Error, Result};
pub use eval::{EvaluationResult, Evaluator, RuleOutcome, RuleResult};
pub use expr::{col, lit, AggFunc, BinaryOp, Expr, Identifier, ScalarValue, UnaryOp};
pub use measure::{Aggregator, Measurement, Reducer};
pub use rule::{Rule, RuleSet, Scope};
