//! Conversion between the glob syntax of the simplified editors and pattern regexes.

/// Characters escaped when a glob is turned into a regex. `*` and `?` are the glob wildcards.
const REGEX_META: &[char] = &['^', '$', '-', '\\', '.', '(', ')', '{', '}', '[', ']', '+'];

/// `ca?s*` becomes `ca.s.*`; regex metacharacters are escaped.
pub fn wildcard_to_regex(value: &str) -> String {
    let mut regex = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c if REGEX_META.contains(&c) => {
                regex.push('\\');
                regex.push(c);
            }
            c => regex.push(c),
        }
    }
    regex
}

/// Reverse of [`wildcard_to_regex`]. Regex constructs without a glob equivalent are kept.
pub fn regex_to_wildcard(value: &str) -> String {
    let mut wildcard = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next) if REGEX_META.contains(&next) => {
                    wildcard.push(next);
                    chars.next();
                }
                _ => wildcard.push('\\'),
            },
            '.' if chars.peek() == Some(&'*') => {
                wildcard.push('*');
                chars.next();
            }
            '.' => wildcard.push('?'),
            c => wildcard.push(c),
        }
    }
    wildcard
}
