/// Characters with a meaning in the filter query syntax.
const SPECIAL: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '/',
];

/// Backslash-escape query syntax characters in a single bare value.
pub fn escape_lucene(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Drop the backslash in front of every escaped character.
pub fn unescape_lucene(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescaped.push(chars.next().unwrap_or('\\')),
            c => unescaped.push(c),
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape_lucene("plain"), "plain");
        assert_eq!(escape_lucene("a:b"), r"a\:b");
        assert_eq!(escape_lucene("c++ (v2)"), r"c\+\+ \(v2\)");
        assert_eq!(escape_lucene(r"back\slash"), r"back\\slash");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_lucene(r"a\:b"), "a:b");
        assert_eq!(unescape_lucene(r"back\\slash"), r"back\slash");
        assert_eq!(unescape_lucene("trailing\\"), "trailing\\");
        assert_eq!(unescape_lucene(&escape_lucene("x-y/z?")), "x-y/z?");
    }
}
