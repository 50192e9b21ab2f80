use super::error::FilterError;
use super::parser::{FieldFilter, NumericComparison, Predicate};
use crate::record::Record;

impl FieldFilter {
    /// Test a raw field value against this filter.
    ///
    /// A value that is not a number never satisfies an arithmetic comparison.
    pub fn matches(&self, value: &str) -> bool {
        match &self.predicate {
            Predicate::Numeric {
                comparison,
                threshold,
            } => {
                let number = match value.parse::<f64>() {
                    Ok(number) => number,
                    Err(e) => {
                        tracing::debug!(
                            field = %self.field,
                            value,
                            filter = self.spec(),
                            "non-numeric value for arithmetic filter: {e}"
                        );
                        return false;
                    }
                };
                match comparison {
                    NumericComparison::Greater => number > *threshold,
                    NumericComparison::GreaterOrEqual => number >= *threshold,
                    NumericComparison::Less => number < *threshold,
                    NumericComparison::LessOrEqual => number <= *threshold,
                }
            }
            Predicate::Text {
                literal,
                negate,
                fold_case,
            } => {
                let equal = if *fold_case {
                    value.to_lowercase() == *literal
                } else {
                    value == literal
                };
                equal != *negate
            }
            Predicate::Pattern { regex, negate } => regex.is_match(value) != *negate,
        }
    }

    /// Test the filter's field in `record`; a missing field is tested as "".
    pub fn matches_record(&self, record: &Record) -> bool {
        self.matches(record.value_or_empty(&self.field))
    }
}

/// All filters of a run, combined with AND
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<FieldFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every spec, failing on the first malformed one
    pub fn compile<S: AsRef<str>>(specs: &[S]) -> Result<Self, FilterError> {
        let filters = specs
            .iter()
            .map(|spec| FieldFilter::parse(spec.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FilterSet { filters })
    }

    /// Whether `record` satisfies every filter, stopping at the first failure
    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|filter| filter.matches_record(record))
    }

    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(spec: &str, value: &str) -> bool {
        FieldFilter::parse(spec).unwrap().matches(value)
    }

    #[test]
    fn test_arithmetic_comparison() {
        assert!(check("resptime > 6", "10"));
        assert!(!check("resptime > 6", "5"));
        assert!(check("resptime >= 6", "6"));
        assert!(!check("resptime < 6", "7"));
        assert!(!check("resptime <= 6", "7"));
        assert!(check("resptime <= 6.5", "6.25"));
    }

    #[test]
    fn test_arithmetic_comparison_rejects_non_numeric_value() {
        assert!(!check("resptime > 6", "slow"));
        assert!(!check("resptime < 6", ""));
    }

    #[test]
    fn test_string_comparison() {
        assert!(check("resptime == 60", "60"));
        assert!(check("uri == /top", "/top"));
        assert!(check("uri ==* /TOP", "/top"));
        assert!(check("uri != /top", "/bottom"));
        assert!(!check("uri != /top", "/top"));
        assert!(!check("uri !=* /top", "/TOP"));
        assert!(!check("uri == /top", "/TOP"));
    }

    #[test]
    fn test_regex_comparison() {
        assert!(check("uri =~ ^/", "/top"));
        assert!(!check("uri !~ ^/", "/top"));
        assert!(check("uri =~* ^/", "/TOP"));
        assert!(!check("uri !~* /top", "/TOP"));
        assert!(check("uri =~* ^/TOP$", "/top"));
        assert!(!check("uri =~ ^/TOP$", "/top"));
    }

    #[test]
    fn test_fold_case_regex_keeps_escape_classes() {
        // lower-casing the pattern would turn `\D` into `\d`
        assert!(check(r"code =~* ^\D+$", "ABC"));
        assert!(!check(r"code =~* ^\D+$", "A1"));
        assert!(check(r"ua !~* \S+bot", "Mozilla"));
        assert!(!check(r"ua !~* \S+bot", "GoogleBOT"));
    }

    #[test]
    fn test_missing_field_is_empty_string() {
        let record = Record::parse("status:200");
        assert!(
            FieldFilter::parse("uri == ")
                .unwrap()
                .matches_record(&record)
        );
        assert!(
            !FieldFilter::parse("uri =~ .")
                .unwrap()
                .matches_record(&record)
        );
    }

    #[test]
    fn test_filter_set_is_conjunction() {
        let set = FilterSet::compile(&["resptime > 6", "uri =~ ^/foo"]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.matches(&Record::parse("resptime:10\turi:/foo/bar")));
        assert!(!set.matches(&Record::parse("resptime:10\turi:/bar")));
        assert!(!set.matches(&Record::parse("resptime:1\turi:/foo")));
    }

    #[test]
    fn test_filters_on_same_field_all_apply() {
        let set = FilterSet::compile(&["resptime > 1", "resptime < 5"]).unwrap();
        assert!(set.matches(&Record::parse("resptime:3")));
        assert!(!set.matches(&Record::parse("resptime:7")));
    }

    #[test]
    fn test_empty_filter_set_accepts_everything() {
        let set = FilterSet::compile::<&str>(&[]).unwrap();
        assert!(set.is_empty());
        assert!(set.matches(&Record::parse("a:1")));
    }

    #[test]
    fn test_compile_fails_on_any_bad_spec() {
        assert!(FilterSet::compile(&["resptime > 6", "uri"]).is_err());
    }
}
