use super::escape::escape_lucene;
use crate::models::{FilterMap, FilterUiType, FilterValue};

/// Serialize the active filters, in field id order, into one AND-joined filter string.
///
/// Returns `None` when no filter has a value.
pub fn filter_string(filters: &FilterMap) -> Option<String> {
    let clauses: Vec<String> = filters.values().filter_map(clause).collect();
    (!clauses.is_empty()).then(|| clauses.join(" AND "))
}

fn clause(filter: &FilterValue) -> Option<String> {
    if !filter.is_active() {
        return None;
    }
    let values: Vec<&str> =
        filter.values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()).collect();

    let value = match filter.ui_type {
        FilterUiType::Range => {
            let bound = |i: usize| {
                filter.values.get(i).map(|v| v.trim()).filter(|v| !v.is_empty()).unwrap_or("*")
            };
            format!("[{} TO {}]", bound(0), bound(1))
        }
        FilterUiType::Select | FilterUiType::Checkbox | FilterUiType::Radio => {
            let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
            format!("({})", quoted.join(" "))
        }
        FilterUiType::Text | FilterUiType::Combobox => match values.as_slice() {
            [single] => free_text(single),
            many => {
                let terms: Vec<String> = many.iter().map(|v| free_text(v)).collect();
                format!("({})", terms.join(" "))
            }
        },
    };
    Some(format!("{}:{value}", filter.id))
}

/// Values with whitespace are quoted, anything else is escaped.
fn free_text(value: &str) -> String {
    if value.contains(char::is_whitespace) { quote(value) } else { escape_lucene(value) }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
