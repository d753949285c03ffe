//! Flattening of per-token attribute tests into per-annotation editor values.
//!
//! `[lemma="a" & pos="N"] [lemma="b"]` becomes `lemma: "a b"`, `pos: "N"`. Each annotation must
//! have a value on every token from the first up to its last, otherwise the editor could not
//! show it; shorter lists are padded with wildcards when the pattern is written back.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::config::TagsetConfig;
use crate::cql::{BoolOp, CASE_SENSITIVE_PREFIX, Comparator, Expr, Token, regex_to_wildcard};
use crate::error::ReconstructError;
use crate::models::{AnnotationValue, AnnotationValues, CorpusSchema};

/// Legacy spelling of the case-sensitivity flag.
const LEGACY_CASE_PREFIX: &str = "(?c)";

/// Rebuild the extended editor values from a token sequence. Any failure rejects the whole
/// sequence; there are no partial results.
///
/// The tagset group only applies when the corpus has a part-of-speech annotation. Its
/// annotations are kept as raw `name="value"` fragments under the tagset's main annotation.
pub fn reconstruct(
    tokens: &[Token],
    schema: &CorpusSchema,
    tagset: Option<&TagsetConfig>,
) -> Result<AnnotationValues, ReconstructError> {
    let tagset = tagset.filter(|_| schema.has_pos_annotation());
    let mut per_annotation: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (index, token) in tokens.iter().enumerate() {
        if !token.is_plain() {
            return Err(ReconstructError::ComplexToken { index });
        }

        let mut queue: VecDeque<&Expr> = token.expression.iter().collect();
        while let Some(expr) = queue.pop_front() {
            let attribute = match expr {
                Expr::Binary { op: BoolOp::And, left, right } => {
                    queue.push_back(left);
                    queue.push_back(right);
                    continue;
                }
                Expr::Binary { op: BoolOp::Or, .. } => {
                    return Err(ReconstructError::NonConjunctive { index });
                }
                Expr::Not(_) => return Err(ReconstructError::Negation { index }),
                Expr::Attribute(attribute) => attribute,
            };

            if !schema.has_annotation(&attribute.name) {
                debug!(annotation = %attribute.name, "ignoring annotation unknown to corpus");
                continue;
            }

            if let Some(tagset) = tagset
                && tagset.contains(&attribute.name)
            {
                let fragment = format!("{}=\"{}\"", attribute.name, attribute.value);
                let values = per_annotation.entry(tagset.main_annotation_id.clone()).or_default();
                if attribute.name == tagset.main_annotation_id {
                    values.insert(0, fragment);
                } else {
                    values.push(fragment);
                }
                continue;
            }

            if attribute.comparator != Comparator::Eq {
                return Err(ReconstructError::UnsupportedComparator {
                    name: attribute.name.clone(),
                    comparator: attribute.comparator.as_str().to_string(),
                });
            }
            let values = per_annotation.entry(attribute.name.clone()).or_default();
            if values.len() != index {
                return Err(ReconstructError::Gap {
                    name: attribute.name.clone(),
                    index,
                    found: values.len(),
                });
            }
            values.push(attribute.value.clone());
        }
    }

    let tagset_main = tagset.map(|t| t.main_annotation_id.as_str());
    Ok(per_annotation
        .into_iter()
        .map(|(id, values)| {
            let value = if tagset_main == Some(id.as_str()) {
                AnnotationValue::new(id.clone(), values.join("&"), false)
            } else {
                annotation_value(&id, values)
            };
            (id, value)
        })
        .collect())
}

fn annotation_value(id: &str, values: Vec<String>) -> AnnotationValue {
    let case_sensitive = values.iter().all(|v| case_prefix(v).is_some());
    let values: Vec<String> = if case_sensitive {
        values
            .into_iter()
            .map(|v| match case_prefix(&v) {
                Some(prefix) => v[prefix.len()..].to_string(),
                None => v,
            })
            .collect()
    } else {
        values
    };
    AnnotationValue::new(id, regex_to_wildcard(&values.join(" ")), case_sensitive)
}

fn case_prefix(value: &str) -> Option<&'static str> {
    [CASE_SENSITIVE_PREFIX, LEGACY_CASE_PREFIX].into_iter().find(|p| value.starts_with(p))
}
