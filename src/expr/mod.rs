//! Derived fields
//!
//! An expression spec assigns the result of an arithmetic expression over
//! other fields to a new (or existing) field:
//!
//! ```text
//! diff = resptime - upstream_resptime
//! diff_ms = (resptime - upstream_resptime) * 1000
//! ```
//!
//! Specs are parsed once and evaluated against every record, in the order
//! they were given, so a later spec may use the output of an earlier one.

pub mod error;
pub mod eval;
pub mod parser;

pub use error::ExprError;
pub use eval::{eval_expr, render};
pub use parser::{BinaryOp, Expr, parse_expr};

use crate::record::Record;

/// A compiled `<key> = <expression>` spec
#[derive(Debug, Clone, PartialEq)]
pub struct ExprSpec {
    pub key: String,
    pub expr: Expr,
    spec: String,
}

impl ExprSpec {
    pub fn parse(spec: &str) -> Result<Self, ExprError> {
        let (key, expression) = spec
            .split_once('=')
            .ok_or_else(|| ExprError::MissingAssignment(spec.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ExprError::EmptyKey(spec.to_string()));
        }

        Ok(ExprSpec {
            key: key.to_string(),
            expr: parse_expr(expression)?,
            spec: spec.to_string(),
        })
    }

    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Evaluate and store the rendered result under `key`.
    ///
    /// On error the record is left untouched.
    pub fn apply(&self, record: &mut Record) -> Result<(), ExprError> {
        let value = eval_expr(&self.expr, record)?;
        record.insert(&self.key, &render(value));
        Ok(())
    }
}

/// All expression specs of a run, in declaration order
#[derive(Debug, Clone, Default)]
pub struct ExprSet {
    specs: Vec<ExprSpec>,
}

impl ExprSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every spec; invalid ones are logged and skipped
    pub fn compile<S: AsRef<str>>(specs: &[S]) -> Self {
        let specs = specs
            .iter()
            .filter_map(|spec| {
                let spec = spec.as_ref();
                match ExprSpec::parse(spec) {
                    Ok(compiled) => Some(compiled),
                    Err(e) => {
                        tracing::warn!(expression = spec, "skipping invalid expression: {e}");
                        None
                    }
                }
            })
            .collect();
        ExprSet { specs }
    }

    /// Evaluate every spec against `record`; failures leave their key unset
    pub fn apply(&self, record: &mut Record) {
        for spec in &self.specs {
            if let Err(e) = spec.apply(record) {
                tracing::debug!(
                    key = %spec.key,
                    expression = spec.spec(),
                    "expression not evaluated: {e}"
                );
            }
        }
    }

    pub fn specs(&self) -> &[ExprSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spec() {
        let spec = ExprSpec::parse("  diff  = resptime - upstream_resptime").unwrap();
        assert_eq!(spec.key, "diff");
        assert!(matches!(spec.expr, Expr::Binary { op: BinaryOp::Sub, .. }));
    }

    #[test]
    fn test_parse_spec_errors() {
        assert!(matches!(
            ExprSpec::parse("diff resptime"),
            Err(ExprError::MissingAssignment(_))
        ));
        assert!(matches!(
            ExprSpec::parse(" = 1 + 1"),
            Err(ExprError::EmptyKey(_))
        ));
        assert!(ExprSpec::parse("diff = resptime -").is_err());
    }

    #[test]
    fn test_apply_adds_field() {
        let spec = ExprSpec::parse("diff = resptime - upstream_resptime").unwrap();
        let mut record = Record::parse("resptime:5\tupstream_resptime:3");
        spec.apply(&mut record).unwrap();
        assert_eq!(record.get("diff"), Some("2"));
        assert_eq!(record.labels(), ["resptime", "upstream_resptime", "diff"]);
    }

    #[test]
    fn test_apply_overwrites_existing_field() {
        let spec = ExprSpec::parse("resptime = resptime * 1000").unwrap();
        let mut record = Record::parse("resptime:0.25\tstatus:200");
        spec.apply(&mut record).unwrap();
        assert_eq!(record.get("resptime"), Some("250"));
        assert_eq!(record.labels(), ["resptime", "status"]);
    }

    #[test]
    fn test_unknown_field_leaves_key_absent() {
        let set = ExprSet::compile(&["diff = resptime - nothing"]);
        let mut record = Record::parse("resptime:5");
        set.apply(&mut record);
        assert!(!record.contains("diff"));
        assert_eq!(record.labels(), ["resptime"]);
    }

    #[test]
    fn test_invalid_specs_are_skipped() {
        let set = ExprSet::compile(&["broken", "ok = 1 + 1", "bad = (1"]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.specs()[0].key, "ok");
    }

    #[test]
    fn test_declaration_order_chains() {
        let set = ExprSet::compile(&[
            "diff = resptime - upstream_resptime",
            "diff_ms = diff * 1000",
        ]);
        let mut record = Record::parse("resptime:0.5\tupstream_resptime:0.125");
        set.apply(&mut record);
        assert_eq!(record.get("diff"), Some("0.375"));
        assert_eq!(record.get("diff_ms"), Some("375"));
    }
}
