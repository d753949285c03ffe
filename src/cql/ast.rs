/// Comparison inside an attribute test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    NotEq,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
        }
    }
}

/// `name="value"` test on a token annotation. `value` is a regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub comparator: Comparator,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, comparator: Comparator, value: impl Into<String>) -> Self {
        Self { name: name.into(), comparator, value: value.into() }
    }
}

/// Boolean combinator between attribute tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// Expression inside `[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Attribute(Attribute),
    Binary { op: BoolOp, left: Box<Expr>, right: Box<Expr> },
    Not(Box<Expr>),
}

impl Expr {
    pub fn attribute(name: &str, value: &str) -> Self {
        Self::Attribute(Attribute::new(name, Comparator::Eq, value))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::Binary { op: BoolOp::And, left: Box::new(left), right: Box::new(right) }
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::Binary { op: BoolOp::Or, left: Box::new(left), right: Box::new(right) }
    }
}

/// `{min,max}` quantifier; `*` is `{0,}`, `+` is `{1,}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeats {
    pub min: u32,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

/// Span tag such as `<s>`, `</s>` or `<s/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTag {
    pub name: String,
    pub kind: TagKind,
}

/// One token position of a pattern
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub leading_xml_tag: Option<XmlTag>,
    pub trailing_xml_tag: Option<XmlTag>,
    /// `None` for `[]`, which matches any token
    pub expression: Option<Expr>,
    pub optional: bool,
    pub repeats: Option<Repeats>,
}

impl Token {
    pub fn new(expression: Option<Expr>) -> Self {
        Self { expression, ..Default::default() }
    }

    /// No tags, quantifier or optional marker.
    pub fn is_plain(&self) -> bool {
        self.leading_xml_tag.is_none()
            && self.trailing_xml_tag.is_none()
            && self.repeats.is_none()
            && !self.optional
    }

    /// Plain, and either `[]` or a single `name="value"` test.
    pub fn is_single_equality(&self) -> bool {
        self.is_plain()
            && match &self.expression {
                None => true,
                Some(Expr::Attribute(a)) => a.comparator == Comparator::Eq,
                Some(_) => false,
            }
    }
}

/// Parse tree of a pattern
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPattern {
    pub tokens: Vec<Token>,
    /// Tag name of a trailing `within <tag/>` clause
    pub within: Option<String>,
}
