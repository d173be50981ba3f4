//! Rule evaluation against a dataset.
//!
//! Evaluation runs in two phases. Resolution walks each rule's free
//! identifiers through a two-tier table (dataset columns first, then the
//! rule's captured scope) and produces owned bindings; column views are
//! cheap `ArrayRef` clones. Compute then runs each rule's expression over
//! its bindings with Arrow kernels: comparisons and arithmetic propagate
//! unknown markers element-wise, and/or use Kleene tri-state logic, and
//! booleans read as 0/1 under arithmetic.
//!
//! Each rule moves `Bound -> Evaluating -> {Evaluated | Failed}`
//! independently; one rule's failure never blocks its siblings, and the
//! returned [`EvaluationResult`] keeps both outcomes in declaration order.
//! There are no automatic retries.
//!
//! Rules only read shared, immutable inputs, so independent rules may be
//! fanned out across worker threads ([`Evaluator::num_workers`]) or given a
//! wall-clock budget ([`Evaluator::timeout`]).

use std::{
    collections::HashMap,
    sync::{mpsc, Arc},
    thread,
    time::{Duration, Instant},
};

use arrow::{
    array::{
        new_null_array, Array, ArrayRef, BooleanArray, Datum, Float64Array, Int64Array, Scalar,
        StringArray,
    },
    compute::{
        self,
        kernels::{cmp, numeric},
    },
    datatypes::DataType,
    error::ArrowError,
};

use crate::{
    dataset::Dataset,
    error::{Error, Result},
    expr::{AggFunc, BinaryOp, Expr, ScalarValue, UnaryOp},
    rule::RuleSet,
};

/// The shape-tagged result of one evaluated rule.
///
/// The evaluator does not ask the expression what shape it will produce; it
/// observes what came out. A column as long as the dataset is row-level,
/// a single value is dataset-level.
#[derive(Debug, Clone)]
pub enum RuleResult {
    /// One value per dataset row, positionally aligned. Unknown markers in
    /// the inputs surface as nulls here; rows are never dropped.
    RowLevel(ArrayRef),
    /// A single value for the whole dataset (the expression aggregated).
    DatasetLevel(ScalarValue),
}

impl RuleResult {
    /// Returns true for row-level results.
    pub fn is_row_level(&self) -> bool {
        matches!(self, Self::RowLevel(_))
    }

    /// Returns the row-level column, if this is one.
    pub fn as_row_level(&self) -> Option<&ArrayRef> {
        match self {
            Self::RowLevel(array) => Some(array),
            Self::DatasetLevel(_) => None,
        }
    }

    /// Returns the dataset-level scalar, if this is one.
    pub fn as_dataset_level(&self) -> Option<&ScalarValue> {
        match self {
            Self::RowLevel(_) => None,
            Self::DatasetLevel(value) => Some(value),
        }
    }
}

/// Terminal state of one rule after an evaluation run.
#[derive(Debug)]
pub enum RuleOutcome {
    /// The rule produced a result.
    Evaluated(RuleResult),
    /// The rule failed; the error records why.
    Failed(Error),
}

/// One rule's slot in an evaluation run.
#[derive(Debug)]
pub(crate) struct RuleRecord {
    pub(crate) name: String,
    pub(crate) rule_key: String,
    pub(crate) outcome: RuleOutcome,
}

/// Per-rule outcomes of evaluating a rule set against a dataset, in
/// declaration order.
///
/// Failed rules are kept alongside successful ones; the output always
/// distinguishes measured rules from failed rules, and never silently
/// drops either.
#[derive(Debug)]
pub struct EvaluationResult {
    row_count: usize,
    pub(crate) records: Vec<RuleRecord>,
}

impl EvaluationResult {
    /// Returns the evaluated dataset's row count.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of rules that ran.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no rules ran.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all outcomes in declaration order.
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, &RuleOutcome)> {
        self.records.iter().map(|r| (r.name.as_str(), &r.outcome))
    }

    /// Returns the canonical expression text for a rule that ran.
    pub fn rule_key(&self, name: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.rule_key.as_str())
    }

    /// Returns the result for a rule, if it evaluated.
    pub fn result(&self, name: &str) -> Option<&RuleResult> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .and_then(|r| match &r.outcome {
                RuleOutcome::Evaluated(result) => Some(result),
                RuleOutcome::Failed(_) => None,
            })
    }

    /// Returns the error for a rule, if it failed.
    pub fn error(&self, name: &str) -> Option<&Error> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .and_then(|r| match &r.outcome {
                RuleOutcome::Evaluated(_) => None,
                RuleOutcome::Failed(error) => Some(error),
            })
    }

    /// Iterates over successfully evaluated rules in declaration order.
    pub fn evaluated(&self) -> impl Iterator<Item = (&str, &RuleResult)> {
        self.records.iter().filter_map(|r| match &r.outcome {
            RuleOutcome::Evaluated(result) => Some((r.name.as_str(), result)),
            RuleOutcome::Failed(_) => None,
        })
    }

    /// Iterates over failed rules in declaration order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.records.iter().filter_map(|r| match &r.outcome {
            RuleOutcome::Evaluated(_) => None,
            RuleOutcome::Failed(error) => Some((r.name.as_str(), error)),
        })
    }

    /// Returns the number of rules that evaluated.
    pub fn evaluated_count(&self) -> usize {
        self.evaluated().count()
    }

    /// Returns the number of rules that failed.
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Returns true if any rule failed.
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

/// Evaluates rule sets against datasets.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arrow::array::{ArrayRef, Int64Array};
/// use medir::{col, lit, DataTable, Evaluator, RuleSet};
///
/// let cyl: ArrayRef = Arc::new(Int64Array::from(vec![6, 6, 4, 6, 8]));
/// let table = DataTable::from_columns(vec![("cyl", cyl)]).unwrap();
///
/// let mut rules = RuleSet::new();
/// rules.bind("cyl_larger_4", col("cyl").gt(lit(4))).unwrap();
///
/// let result = Evaluator::new().evaluate(&rules, &table).unwrap();
/// assert_eq!(result.evaluated_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    num_workers: usize,
    timeout: Option<Duration>,
}

/// A rule ready to compute: its expression plus owned bindings.
struct Task {
    index: usize,
    name: String,
    expr: Expr,
    bindings: HashMap<String, Value>,
}

impl Evaluator {
    /// Creates an evaluator that runs rules sequentially on the calling
    /// thread.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of worker threads (0 = calling thread only).
    #[must_use]
    pub fn num_workers(mut self, workers: usize) -> Self {
        self.num_workers = workers;
        self
    }

    /// Sets a per-rule wall-clock budget.
    ///
    /// With a budget set, every rule runs on its own thread and a rule
    /// whose result does not arrive in time is recorded as
    /// [`Error::EvaluationTimeout`]. The straggler finishes in the
    /// background; expression compute is pure, so nothing observable leaks.
    #[must_use]
    pub fn timeout(mut self, budget: Duration) -> Self {
        self.timeout = Some(budget);
        self
    }

    /// Evaluates every rule in the set against the dataset.
    ///
    /// Per-rule failures (`UnresolvedIdentifier`, `MalformedExpression`,
    /// `EvaluationTimeout`) are recorded in the result, not returned as
    /// this function's error.
    ///
    /// # Errors
    ///
    /// Returns an error only for structural problems with the dataset
    /// itself.
    pub fn evaluate<D: Dataset + ?Sized>(
        &self,
        rules: &RuleSet,
        dataset: &D,
    ) -> Result<EvaluationResult> {
        let row_count = dataset.row_count();

        // Resolution phase: two-tier identifier lookup, columns before
        // captured scope.
        let mut slots: Vec<Option<RuleOutcome>> = Vec::new();
        slots.resize_with(rules.len(), || None);
        let mut tasks: Vec<Task> = Vec::new();

        for (index, rule) in rules.iter().enumerate() {
            let mut bindings = HashMap::new();
            let mut unresolved = None;

            for ident in rule.expr().free_idents() {
                if dataset.has_column(ident) {
                    bindings.insert(ident.to_string(), Value::column(dataset.column(ident)?));
                } else if let Some(value) = rule.scope().get(ident) {
                    bindings.insert(ident.to_string(), Value::from_scalar(value));
                } else {
                    unresolved = Some(ident.to_string());
                    break;
                }
            }

            match unresolved {
                Some(ident) => {
                    slots[index] = Some(RuleOutcome::Failed(Error::unresolved_identifier(
                        rule.name(),
                        ident,
                    )));
                }
                None => tasks.push(Task {
                    index,
                    name: rule.name().to_string(),
                    expr: rule.expr().clone(),
                    bindings,
                }),
            }
        }

        // Compute phase.
        let computed = if let Some(budget) = self.timeout {
            run_with_timeout(tasks, budget, row_count)
        } else if self.num_workers > 0 && tasks.len() > 1 {
            run_parallel(tasks, self.num_workers, row_count)
        } else {
            tasks
                .into_iter()
                .map(|task| (task.index, run_task(task, row_count)))
                .collect()
        };

        for (index, outcome) in computed {
            slots[index] = Some(outcome);
        }

        let records = rules
            .iter()
            .zip(slots)
            .map(|(rule, slot)| {
                let outcome = slot.unwrap_or_else(|| {
                    RuleOutcome::Failed(Error::malformed_expression(
                        rule.name(),
                        "evaluation worker terminated unexpectedly",
                    ))
                });
                RuleRecord {
                    name: rule.name().to_string(),
                    rule_key: rule.expr().to_string(),
                    outcome,
                }
            })
            .collect();

        Ok(EvaluationResult { row_count, records })
    }
}

fn run_task(task: Task, row_count: usize) -> RuleOutcome {
    let computed = eval_expr(&task.expr, &task.bindings)
        .and_then(|value| finish(value, row_count));
    match computed {
        Ok(result) => RuleOutcome::Evaluated(result),
        Err(message) => RuleOutcome::Failed(Error::malformed_expression(task.name, message)),
    }
}

fn run_parallel(tasks: Vec<Task>, workers: usize, row_count: usize) -> Vec<(usize, RuleOutcome)> {
    let workers = workers.min(tasks.len()).max(1);
    let mut chunks: Vec<Vec<Task>> = Vec::new();
    chunks.resize_with(workers, Vec::new);
    for (i, task) in tasks.into_iter().enumerate() {
        chunks[i % workers].push(task);
    }

    thread::scope(|scope| {
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .into_iter()
                        .map(|task| (task.index, run_task(task, row_count)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap_or_default())
            .collect()
    })
}

fn run_with_timeout(
    tasks: Vec<Task>,
    budget: Duration,
    row_count: usize,
) -> Vec<(usize, RuleOutcome)> {
    let total = tasks.len();
    let mut pending: HashMap<usize, String> = tasks
        .iter()
        .map(|task| (task.index, task.name.clone()))
        .collect();

    let (tx, rx) = mpsc::channel();
    for task in tasks {
        let tx = tx.clone();
        let index = task.index;
        thread::spawn(move || {
            let outcome = run_task(task, row_count);
            let _ = tx.send((index, outcome));
        });
    }
    drop(tx);

    let deadline = Instant::now() + budget;
    let mut collected = Vec::with_capacity(total);
    while collected.len() < total {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((index, outcome)) => {
                pending.remove(&index);
                collected.push((index, outcome));
            }
            Err(_) => break,
        }
    }

    let timeout_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
    for (index, rule) in pending {
        collected.push((
            index,
            RuleOutcome::Failed(Error::EvaluationTimeout { rule, timeout_ms }),
        ));
    }
    collected
}

// ─── Kernel layer ───────────────────────────────────────────────────────────

/// An intermediate value: an Arrow array plus whether it broadcasts as a
/// scalar (mirroring the Datum model of the compute kernels).
#[derive(Debug, Clone)]
struct Value {
    array: ArrayRef,
    scalar: bool,
}

impl Value {
    fn column(array: ArrayRef) -> Self {
        Self {
            array,
            scalar: false,
        }
    }

    fn from_scalar(value: &ScalarValue) -> Self {
        let array: ArrayRef = match value {
            ScalarValue::Null => new_null_array(&DataType::Float64, 1),
            ScalarValue::Boolean(b) => Arc::new(BooleanArray::from(vec![*b])),
            ScalarValue::Int64(v) => Arc::new(Int64Array::from(vec![*v])),
            ScalarValue::Float64(v) => Arc::new(Float64Array::from(vec![*v])),
            ScalarValue::Utf8(s) => Arc::new(StringArray::from(vec![s.clone()])),
        };
        Self {
            array,
            scalar: true,
        }
    }

    fn data_type(&self) -> &DataType {
        self.array.data_type()
    }
}

type EvalResult<T> = std::result::Result<T, String>;

fn eval_expr(expr: &Expr, bindings: &HashMap<String, Value>) -> EvalResult<Value> {
    match expr {
        Expr::Ident(name) => bindings
            .get(name)
            .cloned()
            .ok_or_else(|| format!("unbound identifier '{}'", name)),
        Expr::Literal(value) => Ok(Value::from_scalar(value)),
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, bindings)?;
            let r = eval_expr(right, bindings)?;
            eval_binary(*op, l, r)
        }
        Expr::Unary { op, expr } => {
            let value = eval_expr(expr, bindings)?;
            match op {
                UnaryOp::Not => eval_not(value),
                UnaryOp::Neg => eval_neg(value),
            }
        }
        Expr::Aggregate { func, expr } => {
            let value = eval_expr(expr, bindings)?;
            eval_aggregate(*func, &value)
        }
        Expr::IsMissing(expr) => {
            let value = eval_expr(expr, bindings)?;
            let missing = compute::is_null(&value.array).map_err(arrow_msg)?;
            Ok(Value {
                array: Arc::new(missing),
                scalar: value.scalar,
            })
        }
    }
}

fn eval_binary(op: BinaryOp, l: Value, r: Value) -> EvalResult<Value> {
    match op {
        BinaryOp::And | BinaryOp::Or => eval_kleene(op, &l, &r),
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq => {
            let (l, r) = coerce_comparison(l, r)?;
            let scalar = l.scalar && r.scalar;
            let kernel = match op {
                BinaryOp::Eq => cmp::eq,
                BinaryOp::NotEq => cmp::neq,
                BinaryOp::Lt => cmp::lt,
                BinaryOp::LtEq => cmp::lt_eq,
                BinaryOp::Gt => cmp::gt,
                BinaryOp::GtEq => cmp::gt_eq,
                _ => unreachable!("comparison arm only"),
            };
            let out = with_datums(&l, &r, kernel).map_err(arrow_msg)?;
            Ok(Value {
                array: Arc::new(out),
                scalar,
            })
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            let (l, r) = coerce_arithmetic(l, r, op == BinaryOp::Div)?;
            let scalar = l.scalar && r.scalar;
            let kernel = match op {
                BinaryOp::Add => numeric::add,
                BinaryOp::Sub => numeric::sub,
                BinaryOp::Mul => numeric::mul,
                BinaryOp::Div => numeric::div,
                _ => unreachable!("arithmetic arm only"),
            };
            let out = with_datums(&l, &r, kernel).map_err(arrow_msg)?;
            Ok(Value { array: out, scalar })
        }
    }
}

fn eval_kleene(op: BinaryOp, l: &Value, r: &Value) -> EvalResult<Value> {
    let scalar = l.scalar && r.scalar;
    let len = if !l.scalar {
        l.array.len()
    } else if !r.scalar {
        r.array.len()
    } else {
        1
    };

    let lb = as_boolean(l, len)?;
    let rb = as_boolean(r, len)?;
    let out = match op {
        BinaryOp::And => compute::and_kleene(&lb, &rb),
        BinaryOp::Or => compute::or_kleene(&lb, &rb),
        _ => unreachable!("kleene arm only"),
    }
    .map_err(arrow_msg)?;

    Ok(Value {
        array: Arc::new(out),
        scalar,
    })
}

fn eval_not(value: Value) -> EvalResult<Value> {
    let boolean = value
        .array
        .as_any()
        .downcast_ref::<BooleanArray>()
        .ok_or_else(|| format!("cannot apply ! to {}", value.data_type()))?;
    let out = compute::not(boolean).map_err(arrow_msg)?;
    Ok(Value {
        array: Arc::new(out),
        scalar: value.scalar,
    })
}

fn eval_neg(value: Value) -> EvalResult<Value> {
    let value = if value.data_type() == &DataType::Boolean {
        cast_value(value, &DataType::Float64)?
    } else {
        value
    };
    if !is_numeric(value.data_type()) {
        return Err(format!("cannot negate {}", value.data_type()));
    }
    let out = numeric::neg(&value.array).map_err(arrow_msg)?;
    Ok(Value {
        array: out,
        scalar: value.scalar,
    })
}

#[allow(clippy::cast_precision_loss)]
fn eval_aggregate(func: AggFunc, value: &Value) -> EvalResult<Value> {
    let known = value.array.len() - value.array.null_count();

    if func == AggFunc::Count {
        let count = i64::try_from(known).unwrap_or(i64::MAX);
        return Ok(Value {
            array: Arc::new(Int64Array::from(vec![count])),
            scalar: true,
        });
    }

    if value.data_type() != &DataType::Boolean && !is_numeric(value.data_type()) {
        return Err(format!("cannot aggregate {}", value.data_type()));
    }

    let floats = cast_value(value.clone(), &DataType::Float64)?;
    let array = floats
        .array
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| "cast to Float64 produced unexpected type".to_string())?;

    let result = match func {
        AggFunc::Sum => compute::sum(array),
        AggFunc::Mean => compute::sum(array).map(|total| total / known as f64),
        AggFunc::Min => compute::min(array),
        AggFunc::Max => compute::max(array),
        AggFunc::Count => unreachable!("handled above"),
    };

    Ok(Value {
        array: Arc::new(Float64Array::from(vec![result])),
        scalar: true,
    })
}

fn finish(value: Value, row_count: usize) -> EvalResult<RuleResult> {
    if value.scalar {
        return Ok(RuleResult::DatasetLevel(extract_scalar(&value.array)?));
    }
    if value.array.len() == row_count {
        return Ok(RuleResult::RowLevel(value.array));
    }
    Err(format!(
        "result has {} entries for a dataset with {} rows",
        value.array.len(),
        row_count
    ))
}

fn extract_scalar(array: &ArrayRef) -> EvalResult<ScalarValue> {
    if array.len() != 1 {
        return Err(format!("expected a single value, got {}", array.len()));
    }
    if array.is_null(0) {
        return Ok(ScalarValue::Null);
    }
    match array.data_type() {
        DataType::Boolean => array
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| ScalarValue::Boolean(a.value(0)))
            .ok_or_else(|| "boolean downcast failed".to_string()),
        DataType::Int64 => array
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| ScalarValue::Int64(a.value(0)))
            .ok_or_else(|| "int64 downcast failed".to_string()),
        DataType::Float64 => array
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| ScalarValue::Float64(a.value(0)))
            .ok_or_else(|| "float64 downcast failed".to_string()),
        DataType::Utf8 => array
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| ScalarValue::Utf8(a.value(0).to_string()))
            .ok_or_else(|| "utf8 downcast failed".to_string()),
        dt if is_numeric(dt) => {
            let floats = compute::cast(array, &DataType::Float64).map_err(arrow_msg)?;
            extract_scalar(&floats)
        }
        dt => Err(format!("unsupported scalar type {}", dt)),
    }
}

fn with_datums<R>(
    l: &Value,
    r: &Value,
    kernel: impl Fn(&dyn Datum, &dyn Datum) -> std::result::Result<R, ArrowError>,
) -> std::result::Result<R, ArrowError> {
    match (l.scalar, r.scalar) {
        (false, false) => kernel(&l.array, &r.array),
        (true, false) => kernel(&Scalar::new(l.array.clone()), &r.array),
        (false, true) => kernel(&l.array, &Scalar::new(r.array.clone())),
        (true, true) => kernel(&Scalar::new(l.array.clone()), &Scalar::new(r.array.clone())),
    }
}

fn as_boolean(value: &Value, len: usize) -> EvalResult<BooleanArray> {
    let boolean = value
        .array
        .as_any()
        .downcast_ref::<BooleanArray>()
        .ok_or_else(|| format!("expected a boolean operand, got {}", value.data_type()))?;
    if value.scalar && len != 1 {
        let broadcast = if boolean.is_null(0) {
            None
        } else {
            Some(boolean.value(0))
        };
        Ok(BooleanArray::from(vec![broadcast; len]))
    } else {
        Ok(boolean.clone())
    }
}

fn coerce_comparison(l: Value, r: Value) -> EvalResult<(Value, Value)> {
    if l.data_type() == r.data_type() {
        return Ok((l, r));
    }

    let comparable =
        |dt: &DataType| is_numeric(dt) || *dt == DataType::Boolean || *dt == DataType::Null;
    if !comparable(l.data_type()) || !comparable(r.data_type()) {
        return Err(format!(
            "cannot compare {} to {}",
            l.data_type(),
            r.data_type()
        ));
    }

    if is_integer(l.data_type()) && is_integer(r.data_type()) {
        Ok((
            cast_value(l, &DataType::Int64)?,
            cast_value(r, &DataType::Int64)?,
        ))
    } else {
        Ok((
            cast_value(l, &DataType::Float64)?,
            cast_value(r, &DataType::Float64)?,
        ))
    }
}

fn coerce_arithmetic(l: Value, r: Value, float_only: bool) -> EvalResult<(Value, Value)> {
    // Booleans read as 0/1 so a violation flag times a magnitude column
    // yields a materiality column.
    let l = if l.data_type() == &DataType::Boolean {
        cast_value(l, &DataType::Float64)?
    } else {
        l
    };
    let r = if r.data_type() == &DataType::Boolean {
        cast_value(r, &DataType::Float64)?
    } else {
        r
    };

    if !is_numeric(l.data_type()) || !is_numeric(r.data_type()) {
        return Err(format!(
            "cannot apply arithmetic to {} and {}",
            l.data_type(),
            r.data_type()
        ));
    }

    if float_only {
        return Ok((
            cast_value(l, &DataType::Float64)?,
            cast_value(r, &DataType::Float64)?,
        ));
    }

    if l.data_type() == r.data_type() {
        Ok((l, r))
    } else if is_integer(l.data_type()) && is_integer(r.data_type()) {
        Ok((
            cast_value(l, &DataType::Int64)?,
            cast_value(r, &DataType::Int64)?,
        ))
    } else {
        Ok((
            cast_value(l, &DataType::Float64)?,
            cast_value(r, &DataType::Float64)?,
        ))
    }
}

fn cast_value(value: Value, to: &DataType) -> EvalResult<Value> {
    if value.data_type() == to {
        return Ok(value);
    }
    let array = compute::cast(&value.array, to).map_err(arrow_msg)?;
    Ok(Value {
        array,
        scalar: value.scalar,
    })
}

fn is_integer(dt: &DataType) -> bool {
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
    )
}

fn is_numeric(dt: &DataType) -> bool {
    is_integer(dt) || matches!(dt, DataType::Float16 | DataType::Float32 | DataType::Float64)
}

fn arrow_msg(error: ArrowError) -> String {
    error.to_string()
}
