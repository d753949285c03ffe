/// Shape of the value part of a `field:value` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    /// `field:[lo TO hi]`
    Range,
    /// `field:value`, `field:"a phrase"` or `field:(a b c)`
    Terms,
}

/// Constraint on one metadata field
///
/// Bare values keep their backslash escapes; quoted values are stored without quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub kind: ClauseKind,
    pub values: Vec<String>,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, kind: ClauseKind, values: Vec<String>) -> Self {
        Self { field: field.into(), kind, values }
    }
}

/// Conjunction of field constraints
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterExpr {
    pub filters: Vec<FieldFilter>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(&mut self, filter: FieldFilter) {
        self.filters.push(filter);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
