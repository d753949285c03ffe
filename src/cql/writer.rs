use super::wildcard::wildcard_to_regex;
use crate::models::{
    AnnotationValue, AnnotationValues, ExploreQuery, ExtendedPattern, NgramState, PatternQuery,
    QueryForm,
};

/// Marks a value as case-sensitive; the reconstructor also accepts `(?c)`.
pub const CASE_SENSITIVE_PREFIX: &str = "(?-i)";

/// Pattern string of a submitted form, or `None` when the form holds no pattern.
///
/// `tagset_main` names the annotation whose value is a pre-built `name="value"&...` fragment
/// that is emitted verbatim in the first token.
pub fn pattern_string(
    form: &QueryForm,
    main_annotation_id: &str,
    tagset_main: Option<&str>,
) -> Option<String> {
    match form {
        QueryForm::Search(PatternQuery::Simple(value)) => {
            let value = value.as_deref().filter(|v| !v.trim().is_empty())?;
            let mut values = AnnotationValues::new();
            values.insert(
                main_annotation_id.to_string(),
                AnnotationValue::new(main_annotation_id, value, false),
            );
            annotation_pattern(&values, None, None)
        }
        QueryForm::Search(PatternQuery::Extended(ExtendedPattern { annotation_values, within })) => {
            annotation_pattern(annotation_values, within.as_deref(), tagset_main)
        }
        QueryForm::Search(PatternQuery::Advanced(value) | PatternQuery::Expert(value)) => {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
        }
        QueryForm::Explore(ExploreQuery::Frequency(_)) => Some("[]".to_string()),
        QueryForm::Explore(ExploreQuery::Ngram(ngram)) => Some(ngram_pattern(ngram)),
    }
}

fn annotation_pattern(
    values: &AnnotationValues,
    within: Option<&str>,
    tagset_main: Option<&str>,
) -> Option<String> {
    let mut tokens: Vec<Vec<String>> = Vec::new();

    for annotation in values.values() {
        let value = annotation.value.trim();
        if value.is_empty() {
            continue;
        }
        if tagset_main == Some(annotation.id.as_str()) {
            token_slot(&mut tokens, 0).push(value.to_string());
            continue;
        }
        for (index, word) in value.split_whitespace().enumerate() {
            let mut regex = wildcard_to_regex(word);
            if annotation.case_sensitive {
                regex.insert_str(0, CASE_SENSITIVE_PREFIX);
            }
            token_slot(&mut tokens, index).push(clause(&annotation.id, &regex));
        }
    }

    if tokens.is_empty() {
        return None;
    }

    let mut pattern =
        tokens.iter().map(|clauses| token(clauses)).collect::<Vec<_>>().join(" ");
    if let Some(tag) = within.map(str::trim).filter(|t| !t.is_empty()) {
        pattern.push_str(&format!(" within <{tag}/>"));
    }
    Some(pattern)
}

fn ngram_pattern(ngram: &NgramState) -> String {
    ngram
        .active_tokens()
        .iter()
        .map(|t| {
            let value = t.value.trim();
            if value.is_empty() {
                "[]".to_string()
            } else {
                format!("[{}]", clause(&t.id, &wildcard_to_regex(value)))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn token_slot(tokens: &mut Vec<Vec<String>>, index: usize) -> &mut Vec<String> {
    if tokens.len() <= index {
        tokens.resize_with(index + 1, Vec::new);
    }
    &mut tokens[index]
}

fn token(clauses: &[String]) -> String {
    if clauses.is_empty() { "[]".to_string() } else { format!("[{}]", clauses.join(" & ")) }
}

fn clause(annotation_id: &str, regex: &str) -> String {
    format!("{annotation_id}=\"{}\"", regex.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FrequencyState, NgramToken};

    fn extended(values: &[(&str, &str, bool)], within: Option<&str>) -> QueryForm {
        let annotation_values = values
            .iter()
            .map(|&(id, value, case)| (id.to_string(), AnnotationValue::new(id, value, case)))
            .collect();
        QueryForm::Search(PatternQuery::Extended(ExtendedPattern {
            annotation_values,
            within: within.map(str::to_string),
        }))
    }

    #[test]
    fn test_simple_pattern() {
        let form = QueryForm::Search(PatternQuery::Simple(Some("the ca*".to_string())));
        assert_eq!(
            pattern_string(&form, "word", None).as_deref(),
            Some(r#"[word="the"] [word="ca.*"]"#)
        );

        let empty = QueryForm::Search(PatternQuery::Simple(Some("  ".to_string())));
        assert_eq!(pattern_string(&empty, "word", None), None);
    }

    #[test]
    fn test_extended_pattern_pads_shorter_lists() {
        let form = extended(&[("lemma", "a b", false), ("pos", "NOU", true)], Some("s"));
        assert_eq!(
            pattern_string(&form, "word", None).as_deref(),
            Some(r#"[lemma="a" & pos="(?-i)NOU"] [lemma="b"] within <s/>"#)
        );

        let gap_first = extended(&[("lemma", "a b", false), ("word", "", false)], None);
        assert_eq!(
            pattern_string(&gap_first, "word", None).as_deref(),
            Some(r#"[lemma="a"] [lemma="b"]"#)
        );
    }

    #[test]
    fn test_tagset_value_is_verbatim() {
        let form = extended(&[("pos", r#"pos="NOU"&num="sg""#, false), ("lemma", "x", false)], None);
        assert_eq!(
            pattern_string(&form, "word", Some("pos")).as_deref(),
            Some(r#"[lemma="x" & pos="NOU"&num="sg"]"#)
        );
    }

    #[test]
    fn test_quotes_are_escaped() {
        let form = extended(&[("word", r#"say"hi"#, false)], None);
        assert_eq!(
            pattern_string(&form, "word", None).as_deref(),
            Some(r#"[word="say\"hi"]"#)
        );
    }

    #[test]
    fn test_explore_patterns() {
        let frequency = QueryForm::Explore(ExploreQuery::Frequency(FrequencyState {
            annotation_id: "lemma".to_string(),
        }));
        assert_eq!(pattern_string(&frequency, "word", None).as_deref(), Some("[]"));

        let mut ngram = NgramState::empty("word", 5);
        ngram.size = 3;
        ngram.tokens[1] = NgramToken { id: "lemma".to_string(), value: "b?".to_string() };
        let form = QueryForm::Explore(ExploreQuery::Ngram(ngram));
        assert_eq!(
            pattern_string(&form, "word", None).as_deref(),
            Some(r#"[] [lemma="b."] []"#)
        );
    }

    #[test]
    fn test_expert_is_verbatim() {
        let form = QueryForm::Search(PatternQuery::Expert(Some(" [word=\"a\"]+ ".to_string())));
        assert_eq!(pattern_string(&form, "word", None).as_deref(), Some("[word=\"a\"]+"));
        let empty = QueryForm::Search(PatternQuery::Advanced(None));
        assert_eq!(pattern_string(&empty, "word", None), None);
    }
}
