use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison operators a filter predicate can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    In,
    #[serde(rename = "not")]
    NotIn,
    InInsensitive,
    #[serde(rename = "not_insensitive")]
    NotInInsensitive,
    Prefix,
    PrefixCaseInsensitive,
    Postfix,
    PostfixCaseInsensitive,
    Infix,
    InfixCaseInsensitive,
    Lt,
    Le,
    Gt,
    Ge,
    #[serde(rename = "isnull")]
    IsNull,
    #[serde(rename = "notnull")]
    NotNull,
    True,
    False,
}

impl Operator {
    /// Whether the operator takes its operands through bound parameters.
    pub fn is_parameterized(&self) -> bool {
        !matches!(
            self,
            Operator::IsNull | Operator::NotNull | Operator::True | Operator::False
        )
    }

    /// Membership operators bind their whole operand list.
    pub fn is_list_valued(&self) -> bool {
        matches!(
            self,
            Operator::In | Operator::NotIn | Operator::InInsensitive | Operator::NotInInsensitive
        )
    }

    /// Pattern-match operators whose operand must have LIKE wildcards escaped.
    pub fn is_matching(&self) -> bool {
        matches!(
            self,
            Operator::Prefix
                | Operator::PrefixCaseInsensitive
                | Operator::Postfix
                | Operator::PostfixCaseInsensitive
                | Operator::Infix
                | Operator::InfixCaseInsensitive
        )
    }

    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            Operator::InInsensitive
                | Operator::NotInInsensitive
                | Operator::PrefixCaseInsensitive
                | Operator::PostfixCaseInsensitive
                | Operator::InfixCaseInsensitive
        )
    }

    /// Render the boolean fragment for `field`, with `param` as the bound name.
    pub fn render(&self, field: &str, param: &str) -> String {
        match self {
            Operator::In => format!("{} IN (:{})", field, param),
            Operator::NotIn => format!("{} NOT IN (:{})", field, param),
            Operator::InInsensitive => format!("lower({}) IN (:{})", field, param),
            Operator::NotInInsensitive => format!("lower({}) NOT IN (:{})", field, param),
            Operator::Prefix => format!("{} LIKE CONCAT(:{}, '%')", field, param),
            Operator::PrefixCaseInsensitive => {
                format!("lower({}) LIKE CONCAT(lower(:{}), '%')", field, param)
            }
            Operator::Postfix => format!("{} LIKE CONCAT('%', :{})", field, param),
            Operator::PostfixCaseInsensitive => {
                format!("lower({}) LIKE CONCAT('%', lower(:{}))", field, param)
            }
            Operator::Infix => format!("{} LIKE CONCAT('%', :{}, '%')", field, param),
            Operator::InfixCaseInsensitive => {
                format!("lower({}) LIKE CONCAT('%', lower(:{}), '%')", field, param)
            }
            Operator::Lt => format!("{} < :{}", field, param),
            Operator::Le => format!("{} <= :{}", field, param),
            Operator::Gt => format!("{} > :{}", field, param),
            Operator::Ge => format!("{} >= :{}", field, param),
            Operator::IsNull => format!("{} IS NULL", field),
            Operator::NotNull => format!("{} IS NOT NULL", field),
            Operator::True => "(1 = 1)".to_string(),
            Operator::False => "(1 = 0)".to_string(),
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::In => "in",
            Operator::NotIn => "not",
            Operator::InInsensitive => "in_insensitive",
            Operator::NotInInsensitive => "not_insensitive",
            Operator::Prefix => "prefix",
            Operator::PrefixCaseInsensitive => "prefix_case_insensitive",
            Operator::Postfix => "postfix",
            Operator::PostfixCaseInsensitive => "postfix_case_insensitive",
            Operator::Infix => "infix",
            Operator::InfixCaseInsensitive => "infix_case_insensitive",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::IsNull => "isnull",
            Operator::NotNull => "notnull",
            Operator::True => "true",
            Operator::False => "false",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword().to_uppercase())
    }
}

/// Escape LIKE metacharacters so the operand matches literally.
///
/// The escape character is escaped first so the backslashes added for `%`
/// are not doubled.
pub fn escape_like(value: &str) -> String {
    value.replace('\\', "\\\\").replace('%', "\\%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameterized_flags() {
        assert!(Operator::In.is_parameterized());
        assert!(Operator::Lt.is_parameterized());
        assert!(!Operator::IsNull.is_parameterized());
        assert!(!Operator::True.is_parameterized());
    }

    #[test]
    fn test_list_and_matching_are_disjoint() {
        for op in [
            Operator::In,
            Operator::NotIn,
            Operator::Prefix,
            Operator::InfixCaseInsensitive,
            Operator::Ge,
        ] {
            assert!(!(op.is_list_valued() && op.is_matching()), "{:?}", op);
        }
    }

    #[test]
    fn test_render_membership() {
        assert_eq!(Operator::In.render("a.title", "p_0"), "a.title IN (:p_0)");
        assert_eq!(
            Operator::NotInInsensitive.render("a.title", "p_0"),
            "lower(a.title) NOT IN (:p_0)"
        );
    }

    #[test]
    fn test_render_pattern_match() {
        assert_eq!(
            Operator::Prefix.render("a.title", "p"),
            "a.title LIKE CONCAT(:p, '%')"
        );
        assert_eq!(
            Operator::InfixCaseInsensitive.render("a.title", "p"),
            "lower(a.title) LIKE CONCAT('%', lower(:p), '%')"
        );
    }

    #[test]
    fn test_render_constant_predicates() {
        assert_eq!(Operator::True.render("ignored", "ignored"), "(1 = 1)");
        assert_eq!(Operator::False.render("ignored", "ignored"), "(1 = 0)");
        assert_eq!(Operator::NotNull.render("a.x", "p"), "a.x IS NOT NULL");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("\\%"), "\\\\\\%");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_serde_keywords() {
        let op: Operator = serde_json::from_str("\"not\"").unwrap();
        assert_eq!(op, Operator::NotIn);
        let op: Operator = serde_json::from_str("\"prefix_case_insensitive\"").unwrap();
        assert_eq!(op, Operator::PrefixCaseInsensitive);
        let op: Operator = serde_json::from_str("\"isnull\"").unwrap();
        assert_eq!(op, Operator::IsNull);
    }
}
