//! Mapping from declared column types to semantic field types.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use rowmodel_core::FieldType;

/// Ordered rules; the first pattern that matches decides the type. Evaluation order
/// is part of the contract.
const RULES: &[(&str, FieldType)] = &[
    (r"^binary", FieldType::Binary),
    (r"^datetime", FieldType::DateTime),
    (r"^(smallint|int|tinyint|mediumint|bigint)", FieldType::Integer),
    (r"^(number|decimal|float|double)", FieldType::Float),
    (r"^(text|char|blob|varchar|string)", FieldType::String),
];

fn compiled_rules() -> &'static [(Regex, FieldType)] {
    static RULESET: OnceLock<Vec<(Regex, FieldType)>> = OnceLock::new();
    RULESET.get_or_init(|| {
        RULES
            .iter()
            .filter_map(|(pattern, field_type)| {
                match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(regex) => Some((regex, *field_type)),
                    Err(e) => {
                        tracing::warn!(
                            pattern = pattern,
                            error = %e,
                            "Invalid type catalog pattern, rule skipped"
                        );
                        None
                    }
                }
            })
            .collect()
    })
}

/// Classify a driver-reported column type such as `varchar(64)` or
/// `int(10) unsigned`.
///
/// ```
/// use rowmodel_core::FieldType;
/// use rowmodel_schema::classify;
///
/// assert_eq!(classify("bigint(20) unsigned"), FieldType::Integer);
/// assert_eq!(classify("binary(16)"), FieldType::Binary);
/// assert_eq!(classify("geometry"), FieldType::Unknown);
/// ```
pub fn classify(declared_type: &str) -> FieldType {
    let declared_type = declared_type.trim();
    compiled_rules()
        .iter()
        .find(|(regex, _)| regex.is_match(declared_type))
        .map_or(FieldType::Unknown, |(_, field_type)| *field_type)
}
