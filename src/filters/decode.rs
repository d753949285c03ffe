use tracing::{debug, warn};

use super::FilterParser;
use super::ast::FilterExpr;
use super::escape::unescape_lucene;
use crate::error::InvariantViolation;
use crate::models::{CorpusSchema, FilterMap, FilterUiType, FilterValue};

/// Map a parsed filter expression onto the corpus' metadata fields.
///
/// Clauses on unknown fields are dropped. Each value takes the uiType the corpus declares for
/// its field, and free-text values have their escaping reversed. A declared uiType without a
/// decoding rule is an [`InvariantViolation`].
pub fn decode_filters(expr: &FilterExpr, schema: &CorpusSchema) -> Result<FilterMap, InvariantViolation> {
    let mut filters = FilterMap::new();

    for clause in &expr.filters {
        let Some(field) = schema.metadata_field(&clause.field) else {
            debug!(field = %clause.field, "dropping filter on field unknown to corpus");
            continue;
        };
        let ui_type = FilterUiType::from_declared(&field.ui_type).ok_or_else(|| {
            InvariantViolation::UnsupportedUiType {
                field: field.id.clone(),
                ui_type: field.ui_type.clone(),
            }
        })?;

        let values = if ui_type.is_free_text() {
            // Values with whitespace were quoted when encoded, which already escapes them
            clause
                .values
                .iter()
                .map(|v| if v.contains(char::is_whitespace) { v.clone() } else { unescape_lucene(v) })
                .collect()
        } else {
            clause.values.clone()
        };

        filters.insert(field.id.clone(), FilterValue::new(field.id.clone(), ui_type, values));
    }

    Ok(filters)
}

/// Parse and decode a raw filter string.
///
/// Unparsable input yields an empty map; only an [`InvariantViolation`] is an error.
pub fn decode_filter_string(
    input: Option<&str>,
    parser: &dyn FilterParser,
    schema: &CorpusSchema,
) -> Result<FilterMap, InvariantViolation> {
    let Some(input) = input.filter(|s| !s.is_empty()) else {
        return Ok(FilterMap::new());
    };
    match parser.parse_filter(input) {
        Ok(expr) => decode_filters(&expr, schema),
        Err(err) => {
            warn!(filter = input, error = %err, "cannot decode filter, ignoring all filters");
            Ok(FilterMap::new())
        }
    }
}
