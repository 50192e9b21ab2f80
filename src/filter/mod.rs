//! Field filters
//!
//! A filter compares one field of a record against a literal. Filters are
//! compiled once from their textual form and then applied to every record.
//!
//! # Syntax
//!
//! ```text
//! <field> <operator> <value>
//! ```
//!
//! # Operators
//!
//! - `>` `>=` `<` `<=` - arithmetic comparison (both sides parsed as f64)
//! - `==` `==*` `!=` `!=*` - string comparison
//! - `=~` `!~` `=~*` `!~*` - regular expression match
//!
//! Operators ending with `*` are case-insensitive. `==*` and `!=*` compare
//! lower-cased text; `=~*` and `!~*` compile the pattern with the regex
//! case-insensitive flag (`(?i)`) instead of lower-casing it, so escapes
//! like `\D` or `\S` keep their meaning. Multiple filters combine with AND.
//!
//! # Examples
//!
//! ```text
//! resptime > 6
//! status != 200
//! uri =~* ^/api/
//! ```

pub mod error;
pub mod matcher;
pub mod parser;

pub use error::FilterError;
pub use matcher::FilterSet;
pub use parser::{FieldFilter, NumericComparison, Operator, Predicate};
