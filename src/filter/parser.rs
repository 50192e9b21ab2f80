use super::error::FilterError;
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::str::FromStr;

/// Comparison operators accepted in a filter spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Equal,
    EqualFold,
    NotEqual,
    NotEqualFold,
    Match,
    NotMatch,
    MatchFold,
    NotMatchFold,
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Operator::Greater),
            ">=" => Ok(Operator::GreaterOrEqual),
            "<" => Ok(Operator::Less),
            "<=" => Ok(Operator::LessOrEqual),
            "==" => Ok(Operator::Equal),
            "==*" => Ok(Operator::EqualFold),
            "!=" => Ok(Operator::NotEqual),
            "!=*" => Ok(Operator::NotEqualFold),
            "=~" => Ok(Operator::Match),
            "!~" => Ok(Operator::NotMatch),
            "=~*" => Ok(Operator::MatchFold),
            "!~*" => Ok(Operator::NotMatchFold),
            _ => Err(()),
        }
    }
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Equal => "==",
            Operator::EqualFold => "==*",
            Operator::NotEqual => "!=",
            Operator::NotEqualFold => "!=*",
            Operator::Match => "=~",
            Operator::NotMatch => "!~",
            Operator::MatchFold => "=~*",
            Operator::NotMatchFold => "!~*",
        }
    }

    /// Whether the operator ends with `*` and compares case-insensitively
    pub fn is_case_insensitive(&self) -> bool {
        self.symbol().ends_with('*')
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Arithmetic comparison applied to a field parsed as `f64`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericComparison {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

/// The compiled right-hand side of a filter, one variant per operator family
#[derive(Debug, Clone)]
pub enum Predicate {
    Numeric {
        comparison: NumericComparison,
        threshold: f64,
    },
    Text {
        literal: String,
        negate: bool,
        fold_case: bool,
    },
    Pattern {
        regex: Regex,
        negate: bool,
    },
}

/// A single compiled filter (e.g. "resptime > 6" or "uri =~* ^/api")
#[derive(Debug, Clone)]
pub struct FieldFilter {
    /// The label whose value is tested
    pub field: String,
    pub operator: Operator,
    pub predicate: Predicate,
    spec: String,
}

impl FieldFilter {
    /// Compile a filter from `<field> <operator> <value>`.
    ///
    /// The value is everything after the single separator following the
    /// operator, so string and regex literals may contain spaces.
    pub fn parse(spec: &str) -> Result<Self, FilterError> {
        let (field, operator_token, literal) =
            split_spec(spec).ok_or_else(|| FilterError::Malformed(spec.to_string()))?;

        let operator: Operator =
            operator_token
                .parse()
                .map_err(|_| FilterError::UnknownOperator {
                    operator: operator_token.to_string(),
                    spec: spec.to_string(),
                })?;

        let predicate = match operator {
            Operator::Greater
            | Operator::GreaterOrEqual
            | Operator::Less
            | Operator::LessOrEqual => {
                let threshold =
                    literal
                        .parse::<f64>()
                        .map_err(|source| FilterError::NonNumericLiteral {
                            literal: literal.to_string(),
                            spec: spec.to_string(),
                            source,
                        })?;
                let comparison = match operator {
                    Operator::Greater => NumericComparison::Greater,
                    Operator::GreaterOrEqual => NumericComparison::GreaterOrEqual,
                    Operator::Less => NumericComparison::Less,
                    _ => NumericComparison::LessOrEqual,
                };
                Predicate::Numeric {
                    comparison,
                    threshold,
                }
            }
            Operator::Equal | Operator::EqualFold | Operator::NotEqual | Operator::NotEqualFold => {
                let fold_case = operator.is_case_insensitive();
                Predicate::Text {
                    literal: if fold_case {
                        literal.to_lowercase()
                    } else {
                        literal.to_string()
                    },
                    negate: matches!(operator, Operator::NotEqual | Operator::NotEqualFold),
                    fold_case,
                }
            }
            Operator::Match | Operator::NotMatch | Operator::MatchFold | Operator::NotMatchFold => {
                let regex = RegexBuilder::new(literal)
                    .case_insensitive(operator.is_case_insensitive())
                    .build()
                    .map_err(|source| FilterError::InvalidRegex {
                        spec: spec.to_string(),
                        source,
                    })?;
                Predicate::Pattern {
                    regex,
                    negate: matches!(operator, Operator::NotMatch | Operator::NotMatchFold),
                }
            }
        };

        Ok(FieldFilter {
            field: field.to_string(),
            operator,
            predicate,
            spec: spec.to_string(),
        })
    }

    /// The textual spec this filter was compiled from
    pub fn spec(&self) -> &str {
        &self.spec
    }
}

/// Split a spec into field, operator and the raw remainder
fn split_spec(spec: &str) -> Option<(&str, &str, &str)> {
    let spec = spec.trim_start();
    let (field, rest) = spec.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    let (operator, literal) = rest.split_once(char::is_whitespace)?;
    if field.is_empty() || operator.is_empty() {
        return None;
    }
    Some((field, operator, literal))
}
