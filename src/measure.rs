//! Measurement aggregation.
//!
//! Reduces row-level rule results to scalar [`Measurement`] records,
//! optionally partitioned by a group column, and passes dataset-level
//! results through unchanged. Unknown markers never enter a reduction:
//! they are excluded from the reduced value and surfaced separately as
//! the measurement's `unknown_count` diagnostic.

use std::{
    collections::HashMap,
    fmt,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use arrow::{
    array::{
        Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
        StringArray, UInt32Array,
    },
    compute,
    datatypes::DataType,
};
use serde::{Deserialize, Serialize};

use crate::{
    dataset::Dataset,
    error::{Error, Result},
    eval::{EvaluationResult, RuleOutcome, RuleResult},
};

/// How a row-level result column reduces to a scalar.
#[derive(Clone)]
pub enum Reducer {
    /// Number of truthy rows: `true` for booleans, non-zero for numerics.
    /// Unknown markers are excluded from both numerator and denominator.
    Count,
    /// Sum of known values (booleans read as 0/1).
    Sum,
    /// Mean of known values.
    Mean,
    /// A caller-supplied reduction over the partition's column.
    Custom(Arc<dyn Fn(&ArrayRef) -> Result<f64> + Send + Sync>),
}

impl Reducer {
    /// Creates a custom reducer from a function over the partition's
    /// column.
    pub fn custom(f: impl Fn(&ArrayRef) -> Result<f64> + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "Count"),
            Self::Sum => write!(f, "Sum"),
            Self::Mean => write!(f, "Mean"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// The durable output of a measurement run: one scalar per rule, or per
/// (rule, group value) pair when grouped.
///
/// A measurement series is identified by `item_key` + `data_id` +
/// `timestamp`, so successive runs over the same data identifier can be
/// compared over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// The measured rule's name.
    pub item_key: String,
    /// Canonical text of the rule's condition.
    pub rule_key: String,
    /// Caller-supplied identifier of the measured dataset.
    pub data_id: Option<String>,
    /// The group value this measurement covers; `None` for ungrouped and
    /// dataset-level measurements.
    pub group_value: Option<String>,
    /// The reduced value.
    pub value: f64,
    /// Unknown markers excluded from the reduction.
    pub unknown_count: usize,
    /// Unix epoch seconds at aggregation time, when requested.
    pub timestamp: Option<u64>,
}

impl Measurement {
    /// Returns the identity of this measurement's time series.
    pub fn series_key(&self) -> (&str, Option<&str>, Option<u64>) {
        (self.item_key.as_str(), self.data_id.as_deref(), self.timestamp)
    }
}

/// Reduces evaluation results to [`Measurement`] records.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arrow::array::{ArrayRef, Int64Array};
/// use medir::{col, lit, Aggregator, DataTable, Evaluator, RuleSet};
///
/// let cyl: ArrayRef = Arc::new(Int64Array::from(vec![6, 6, 4, 6, 8]));
/// let table = DataTable::from_columns(vec![("cyl", cyl)]).unwrap();
///
/// let mut rules = RuleSet::new();
/// rules.bind("cyl_larger_4", col("cyl").gt(lit(4))).unwrap();
///
/// let result = Evaluator::new().evaluate(&rules, &table).unwrap();
/// let measurements = Aggregator::new().aggregate(&result, &table).unwrap();
/// assert_eq!(measurements[0].value, 4.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    group_key: Option<String>,
    reducer: Option<Reducer>,
    data_id: Option<String>,
    timestamped: bool,
}

impl Aggregator {
    /// Creates an aggregator that reduces over the whole dataset with
    /// per-type default reducers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Partitions rows by the given column before reducing.
    ///
    /// Partitions follow the group column's distinct values in order of
    /// first appearance; rows with an unknown group key partition under
    /// the `"null"` label rather than being dropped.
    #[must_use]
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_key = Some(column.into());
        self
    }

    /// Sets the reducer for row-level columns.
    ///
    /// Without one, boolean columns reduce with [`Reducer::Count`] and
    /// numeric columns with [`Reducer::Sum`].
    #[must_use]
    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = Some(reducer);
        self
    }

    /// Sets the data identifier stamped on every measurement.
    #[must_use]
    pub fn data_id(mut self, id: impl Into<String>) -> Self {
        self.data_id = Some(id.into());
        self
    }

    /// Enables or disables timestamping measurements.
    #[must_use]
    pub fn timestamped(mut self, enabled: bool) -> Self {
        self.timestamped = enabled;
        self
    }

    /// Reduces every evaluated rule to measurements.
    ///
    /// Row-level results reduce per partition; dataset-level results pass
    /// through as a single measurement regardless of grouping. Failed
    /// rules are not measured; they stay visible in the
    /// [`EvaluationResult`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownGroupColumn`] if the group column is
    /// absent, or [`Error::MalformedExpression`] if a row-level column
    /// cannot be reduced (non-boolean, non-numeric).
    pub fn aggregate<D: Dataset + ?Sized>(
        &self,
        result: &EvaluationResult,
        dataset: &D,
    ) -> Result<Vec<Measurement>> {
        let timestamp = self.timestamped.then(unix_timestamp);

        let partitions = match &self.group_key {
            Some(name) => {
                let column = dataset
                    .column(name)
                    .map_err(|_| Error::UnknownGroupColumn { name: name.clone() })?;
                Some(partition_by(&column))
            }
            None => None,
        };

        let mut measurements = Vec::new();
        for record in &result.records {
            let rule_result = match &record.outcome {
                RuleOutcome::Evaluated(rule_result) => rule_result,
                RuleOutcome::Failed(_) => continue,
            };

            let base = Measurement {
                item_key: record.name.clone(),
                rule_key: record.rule_key.clone(),
                data_id: self.data_id.clone(),
                group_value: None,
                value: 0.0,
                unknown_count: 0,
                timestamp,
            };

            match rule_result {
                RuleResult::DatasetLevel(scalar) => {
                    let (value, unknown_count) = match scalar.as_f64() {
                        Some(value) => (value, 0),
                        None => (0.0, 1),
                    };
                    measurements.push(Measurement {
                        value,
                        unknown_count,
                        ..base
                    });
                }
                RuleResult::RowLevel(array) => match &partitions {
                    None => {
                        let (value, unknown_count) =
                            reduce(&record.name, array, self.reducer.as_ref())?;
                        measurements.push(Measurement {
                            value,
                            unknown_count,
                            ..base
                        });
                    }
                    Some(groups) => {
                        for (label, indices) in groups {
                            let taken = compute::take(array, indices, None)?;
                            let (value, unknown_count) =
                                reduce(&record.name, &taken, self.reducer.as_ref())?;
                            measurements.push(Measurement {
                                group_value: Some(label.clone()),
                                value,
                                unknown_count,
                                ..base.clone()
                            });
                        }
                    }
                },
            }
        }

        Ok(measurements)
    }
}

/// Partitions row indices by the group column's values, in order of first
/// appearance.
#[allow(clippy::cast_possible_truncation)]
fn partition_by(column: &ArrayRef) -> Vec<(String, UInt32Array)> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<u32>)> = Vec::new();

    for i in 0..column.len() {
        let label = group_label(column, i);
        let slot = *slots.entry(label.clone()).or_insert_with(|| {
            groups.push((label, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(i as u32);
    }

    groups
        .into_iter()
        .map(|(label, indices)| (label, UInt32Array::from(indices)))
        .collect()
}

/// Renders a group value at an index to its partition label.
fn group_label(array: &ArrayRef, idx: usize) -> String {
    if array.is_null(idx) {
        return "null".to_string();
    }

    if let Some(a) = array.as_any().downcast_ref::<StringArray>() {
        a.value(idx).to_string()
    } else if let Some(a) = array.as_any().downcast_ref::<Int32Array>() {
        a.value(idx).to_string()
    } else if let Some(a) = array.as_any().downcast_ref::<Int64Array>() {
        a.value(idx).to_string()
    } else if let Some(a) = array.as_any().downcast_ref::<Float64Array>() {
        a.value(idx).to_string()
    } else if let Some(a) = array.as_any().downcast_ref::<Float32Array>() {
        a.value(idx).to_string()
    } else if let Some(a) = array.as_any().downcast_ref::<BooleanArray>() {
        a.value(idx).to_string()
    } else {
        "?".to_string()
    }
}

/// Reduces one partition's column to (value, unknown count).
#[allow(clippy::cast_precision_loss)]
fn reduce(rule: &str, array: &ArrayRef, reducer: Option<&Reducer>) -> Result<(f64, usize)> {
    let unknown = array.null_count();
    let known = array.len() - unknown;

    let default = match array.data_type() {
        DataType::Boolean => Reducer::Count,
        dt if is_numeric(dt) => Reducer::Sum,
        dt => {
            return Err(Error::malformed_expression(
                rule,
                format!("cannot reduce a {} column", dt),
            ))
        }
    };
    let reducer = reducer.unwrap_or(&default);

    let value = match reducer {
        Reducer::Count => count_truthy(rule, array)?,
        Reducer::Sum => sum_known(rule, array)?,
        Reducer::Mean => {
            if known == 0 {
                0.0
            } else {
                sum_known(rule, array)? / known as f64
            }
        }
        Reducer::Custom(f) => f(array)?,
    };

    Ok((value, unknown))
}

#[allow(clippy::cast_precision_loss)]
fn count_truthy(rule: &str, array: &ArrayRef) -> Result<f64> {
    if let Some(booleans) = array.as_any().downcast_ref::<BooleanArray>() {
        return Ok(booleans.true_count() as f64);
    }

    let floats = to_floats(rule, array)?;
    let count = (0..floats.len())
        .filter(|&i| !floats.is_null(i) && floats.value(i) != 0.0)
        .count();
    Ok(count as f64)
}

fn sum_known(rule: &str, array: &ArrayRef) -> Result<f64> {
    let floats = to_floats(rule, array)?;
    Ok(compute::sum(&floats).unwrap_or(0.0))
}

fn to_floats(rule: &str, array: &ArrayRef) -> Result<Float64Array> {
    if array.data_type() != &DataType::Boolean && !is_numeric(array.data_type()) {
        return Err(Error::malformed_expression(
            rule,
            format!("cannot reduce a {} column", array.data_type()),
        ));
    }
    let cast = compute::cast(array, &DataType::Float64)?;
    cast.as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| {
            Error::malformed_expression(rule, "cast to Float64 produced unexpected type")
        })
}

fn is_numeric(dt: &DataType) -> bool {
    matches!(
        dt,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
    )
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::DataTable,
        eval::Evaluator,
        expr::{col, lit},
        rule::RuleSet,
    };

    fn measured_table() -> DataTable {
        let cyl: ArrayRef = Arc::new(Int64Array::from(vec![
            Some(6),
            Some(6),
            Some(4),
            None,
            Some(8),
        ]));
        let mpg: ArrayRef = Arc::new(Float64Array::from(vec![21.0, 21.0, 22.8, 21.4, 18.7]));
        let gear: ArrayRef = Arc::new(StringArray::from(vec!["four", "four", "three", "four", "three"]));
        DataTable::from_columns(vec![("cyl", cyl), ("mpg", mpg), ("gear", gear)]).unwrap()
    }

    fn evaluate(rules: &RuleSet, table: &DataTable) -> EvaluationResult {
        Evaluator::new().evaluate(rules, table).unwrap()
    }

    #[test]
    fn test_count_excludes_unknown() {
        let table = measured_table();
        let mut rules = RuleSet::new();
        rules.bind("cyl_larger_4", col("cyl").gt(lit(4))).unwrap();

        let result = evaluate(&rules, &table);
        let measurements = Aggregator::new().aggregate(&result, &table).unwrap();

        assert_eq!(measurements.len(), 1);
        let m = &measurements[0];
        assert_eq!(m.item_key, "cyl_larger_4");
        assert_eq!(m.rule_key, "cyl > 4");
        // Rows: true, true, false, unknown, true.
        assert_eq!(m.value, 3.0);
        assert_eq!(m.unknown_count, 1);
        assert_eq!(m.group_value, None);
        assert_eq!(m.timestamp, None);
    }

    #[test]
    fn test_numeric_defaults_to_sum() {
        let table = measured_table();
        let mut rules = RuleSet::new();
        rules
            .bind("materiality", col("cyl").gt(lit(4)).mul(col("mpg")))
            .unwrap();

        let result = evaluate(&rules, &table);
        let measurements = Aggregator::new().aggregate(&result, &table).unwrap();

        // 21.0 + 21.0 + 0.0 + unknown + 18.7
        let m = &measurements[0];
        assert!((m.value - 60.7).abs() < 1e-9);
        assert_eq!(m.unknown_count, 1);
    }

    #[test]
    fn test_grouped_counts_sum_to_ungrouped() {
        let table = measured_table();
        let mut rules = RuleSet::new();
        rules.bind("cyl_larger_4", col("cyl").gt(lit(4))).unwrap();

        let result = evaluate(&rules, &table);

        let ungrouped = Aggregator::new().aggregate(&result, &table).unwrap();
        let grouped = Aggregator::new()
            .group_by("gear")
            .aggregate(&result, &table)
            .unwrap();

        // Groups appear in order of first appearance.
        let labels: Vec<Option<&str>> = grouped.iter().map(|m| m.group_value.as_deref()).collect();
        assert_eq!(labels, vec![Some("four"), Some("three")]);

        let grouped_total: f64 = grouped.iter().map(|m| m.value).sum();
        assert_eq!(grouped_total, ungrouped[0].value);

        let unknown_total: usize = grouped.iter().map(|m| m.unknown_count).sum();
        assert_eq!(unknown_total, ungrouped[0].unknown_count);
    }

    #[test]
    fn test_group_key_unknown_rows_keep_a_partition() {
        let key: ArrayRef = Arc::new(StringArray::from(vec![Some("a"), None, Some("a")]));
        let flag: ArrayRef = Arc::new(BooleanArray::from(vec![true, true, false]));
        let table = DataTable::from_columns(vec![("key", key), ("flag", flag)]).unwrap();

        let mut rules = RuleSet::new();
        rules.bind("flagged", col("flag")).unwrap();

        let result = evaluate(&rules, &table);
        let grouped = Aggregator::new()
            .group_by("key")
            .aggregate(&result, &table)
            .unwrap();

        let labels: Vec<Option<&str>> = grouped.iter().map(|m| m.group_value.as_deref()).collect();
        assert_eq!(labels, vec![Some("a"), Some("null")]);
        assert_eq!(grouped[0].value, 1.0);
        assert_eq!(grouped[1].value, 1.0);
    }

    #[test]
    fn test_unknown_group_column() {
        let table = measured_table();
        let mut rules = RuleSet::new();
        rules.bind("cyl_larger_4", col("cyl").gt(lit(4))).unwrap();

        let result = evaluate(&rules, &table);
        let err = Aggregator::new()
            .group_by("region")
            .aggregate(&result, &table)
            .unwrap_err();

        assert!(matches!(err, Error::UnknownGroupColumn { name } if name == "region"));
    }

    #[test]
    fn test_dataset_level_passes_through_grouping() {
        let table = measured_table();
        let mut rules = RuleSet::new();
        rules.bind("mean_mpg", col("mpg").mean()).unwrap();

        let result = evaluate(&rules, &table);
        let grouped = Aggregator::new()
            .group_by("gear")
            .aggregate(&result, &table)
            .unwrap();

        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].group_value, None);
        assert!((grouped[0].value - 20.98).abs() < 1e-9);
    }

    #[test]
    fn test_mean_reducer() {
        let table = measured_table();
        let mut rules = RuleSet::new();
        rules.bind("mpg_copy", col("mpg").mul(lit(1.0))).unwrap();

        let result = evaluate(&rules, &table);
        let measurements = Aggregator::new()
            .reducer(Reducer::Mean)
            .aggregate(&result, &table)
            .unwrap();

        assert!((measurements[0].value - 20.98).abs() < 1e-9);
    }

    #[test]
    fn test_custom_reducer() {
        let table = measured_table();
        let mut rules = RuleSet::new();
        rules.bind("mpg_copy", col("mpg").mul(lit(1.0))).unwrap();

        let result = evaluate(&rules, &table);
        let measurements = Aggregator::new()
            .reducer(Reducer::custom(|array| {
                let floats = array
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| Error::parse("expected Float64"))?;
                Ok(compute::max(floats).unwrap_or(0.0))
            }))
            .aggregate(&result, &table)
            .unwrap();

        assert!((measurements[0].value - 22.8).abs() < 1e-9);
    }

    #[test]
    fn test_count_on_numeric_counts_non_zero() {
        let flags: ArrayRef = Arc::new(Float64Array::from(vec![
            Some(1.0),
            Some(0.0),
            None,
            Some(21.5),
        ]));
        let table = DataTable::from_columns(vec![("flags", flags)]).unwrap();

        let mut rules = RuleSet::new();
        rules.bind("nonzero", col("flags").mul(lit(1.0))).unwrap();

        let result = evaluate(&rules, &table);
        let measurements = Aggregator::new()
            .reducer(Reducer::Count)
            .aggregate(&result, &table)
            .unwrap();

        assert_eq!(measurements[0].value, 2.0);
        assert_eq!(measurements[0].unknown_count, 1);
    }

    #[test]
    fn test_data_id_and_timestamp() {
        let table = measured_table();
        let mut rules = RuleSet::new();
        rules.bind("cyl_larger_4", col("cyl").gt(lit(4))).unwrap();

        let result = evaluate(&rules, &table);
        let measurements = Aggregator::new()
            .data_id("mtcars")
            .timestamped(true)
            .aggregate(&result, &table)
            .unwrap();

        let m = &measurements[0];
        assert_eq!(m.data_id.as_deref(), Some("mtcars"));
        assert!(m.timestamp.is_some());
        assert_eq!(m.series_key().0, "cyl_larger_4");
        assert_eq!(m.series_key().1, Some("mtcars"));
    }

    #[test]
    fn test_failed_rules_are_not_measured() {
        let table = measured_table();
        let mut rules = RuleSet::new();
        rules.bind("bad", col("nope").gt(lit(4))).unwrap();
        rules.bind("good", col("cyl").gt(lit(4))).unwrap();

        let result = evaluate(&rules, &table);
        let measurements = Aggregator::new().aggregate(&result, &table).unwrap();

        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].item_key, "good");
        // The failure stays visible on the evaluation result.
        assert!(result.error("bad").is_some());
    }
}
