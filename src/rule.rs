//! Named rules and the captured environments they close over.
//!
//! Binding stores a condition without evaluating it. Identifiers that are
//! not dataset columns resolve from a [`Scope`] captured at bind time, an
//! explicit name-to-value record rather than a dynamic lookup, so a
//! threshold constant visible when the rule was written stays with the
//! rule.
//!
//! # Example
//!
//! ```
//! use medir::{col, lit, RuleSet, Scope};
//!
//! let scope = Scope::new().with_value("min_cyl", 4);
//! let mut rules = RuleSet::new();
//! rules
//!     .bind_with_scope("cyl_larger_4", col("cyl").gt(col("min_cyl")), scope)
//!     .unwrap();
//! assert_eq!(rules.len(), 1);
//! ```

use std::collections::HashMap;

use crate::{
    error::{Error, Result},
    expr::{Expr, ScalarValue},
};

/// A captured environment: the scalar values visible to the caller when a
/// rule was bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    values: HashMap<String, ScalarValue>,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a captured value, builder-style.
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Adds or replaces a captured value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ScalarValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Looks up a captured value by name.
    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        self.values.get(name)
    }

    /// Returns true if the scope captures the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of captured values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is captured.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named, unevaluated condition plus the scope it closed over.
///
/// Binding is a pure capture: two binds of the same name, expression and
/// scope produce equal rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: String,
    expr: Expr,
    scope: Scope,
}

impl Rule {
    /// Returns the rule's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rule's condition.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Returns the environment captured at bind time.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

/// An ordered collection of uniquely named rules.
///
/// Declaration order is preserved so evaluation output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a condition under a name, with nothing captured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRuleName`] if the name is empty or already
    /// bound in this rule set.
    pub fn bind(&mut self, name: impl Into<String>, expr: Expr) -> Result<()> {
        self.bind_with_scope(name, expr, Scope::new())
    }

    /// Binds a condition under a name, capturing the given scope.
    ///
    /// The expression is stored unevaluated; a condition that cannot be
    /// evaluated is only reported when the rule set is run against a
    /// dataset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRuleName`] if the name is empty or already
    /// bound in this rule set.
    pub fn bind_with_scope(
        &mut self,
        name: impl Into<String>,
        expr: Expr,
        scope: Scope,
    ) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_rule_name(name, "rule name is empty"));
        }
        if self.contains(&name) {
            return Err(Error::invalid_rule_name(name, "already bound"));
        }

        self.rules.push(Rule { name, expr, scope });
        Ok(())
    }

    /// Returns the rule with the given name.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Returns true if a rule with the given name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name == name)
    }

    /// Iterates over the rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Returns the rule names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Returns the number of bound rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are bound.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, lit};

    #[test]
    fn test_bind_preserves_order() {
        let mut rules = RuleSet::new();
        rules.bind("b_rule", col("x").gt(lit(1))).unwrap();
        rules.bind("a_rule", col("x").lt(lit(9))).unwrap();
        rules.bind("c_rule", col("x").is_missing()).unwrap();

        assert_eq!(rules.names(), vec!["b_rule", "a_rule", "c_rule"]);
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_bind_empty_name_rejected() {
        let mut rules = RuleSet::new();
        let result = rules.bind("", col("x").gt(lit(1)));
        assert!(matches!(result, Err(Error::InvalidRuleName { .. })));
        assert!(rules.is_empty());
    }

    #[test]
    fn test_bind_duplicate_name_rejected() {
        let mut rules = RuleSet::new();
        rules.bind("check", col("x").gt(lit(1))).unwrap();

        let result = rules.bind("check", col("y").gt(lit(2)));
        assert!(matches!(result, Err(Error::InvalidRuleName { name, .. }) if name == "check"));

        // The original binding is untouched.
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.get("check").unwrap().expr().to_string(), "x > 1");
    }

    #[test]
    fn test_bind_is_pure_capture() {
        let scope = Scope::new().with_value("threshold", 4);

        let mut a = RuleSet::new();
        a.bind_with_scope("r", col("cyl").gt(col("threshold")), scope.clone())
            .unwrap();

        let mut b = RuleSet::new();
        b.bind_with_scope("r", col("cyl").gt(col("threshold")), scope)
            .unwrap();

        assert_eq!(a.get("r"), b.get("r"));
    }

    #[test]
    fn test_scope_capture() {
        let scope = Scope::new().with_value("limit", 10.5).with_value("tag", "ok");

        assert_eq!(scope.len(), 2);
        assert_eq!(scope.get("limit"), Some(&ScalarValue::Float64(10.5)));
        assert_eq!(scope.get("tag"), Some(&ScalarValue::Utf8("ok".to_string())));
        assert!(scope.get("missing").is_none());
    }

    #[test]
    fn test_scope_set_replaces() {
        let mut scope = Scope::new();
        scope.set("x", 1);
        scope.set("x", 2);
        assert_eq!(scope.get("x"), Some(&ScalarValue::Int64(2)));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_get_missing_rule() {
        let rules = RuleSet::new();
        assert!(rules.get("nope").is_none());
        assert!(!rules.contains("nope"));
    }
}
