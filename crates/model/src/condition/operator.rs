use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};
use std::fmt;

/// Predicate operator carried by a leaf.
///
/// The twelve named variants form the closed operator set. Tags that do not
/// name one of them decode to [`Operator::Unrecognized`], which compiles to
/// no clause at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Between,
    Like,
    NotLike,
    In,
    IsNull,
    IsNotNull,
    Unrecognized,
}

impl Operator {
    /// The recognized operators, in wire-code order (`0` is `Eq`).
    pub const ALL: [Operator; 12] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Lt,
        Operator::Gt,
        Operator::Lte,
        Operator::Gte,
        Operator::Between,
        Operator::Like,
        Operator::NotLike,
        Operator::In,
        Operator::IsNull,
        Operator::IsNotNull,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Neq => "NEQ",
            Operator::Lt => "LT",
            Operator::Gt => "GT",
            Operator::Lte => "LTE",
            Operator::Gte => "GTE",
            Operator::Between => "BETWEEN",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT_LIKE",
            Operator::In => "IN",
            Operator::IsNull => "IS_NULL",
            Operator::IsNotNull => "IS_NOT_NULL",
            Operator::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Looks an operator up by its numeric wire code.
    pub fn from_code(code: u64) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .unwrap_or(Operator::Unrecognized)
    }

    /// Looks an operator up by name. Matching ignores case, and `-` or a
    /// space may stand in for `_`.
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "EQ" | "EQUALS" => Operator::Eq,
            "NEQ" | "NOT_EQUALS" => Operator::Neq,
            "LT" | "LESS_THAN" => Operator::Lt,
            "GT" | "GREATER_THAN" => Operator::Gt,
            "LTE" | "LESS_OR_EQUALS" => Operator::Lte,
            "GTE" | "GREATER_OR_EQUALS" => Operator::Gte,
            "BETWEEN" => Operator::Between,
            "LIKE" => Operator::Like,
            "NOT_LIKE" => Operator::NotLike,
            "IN" => Operator::In,
            "IS_NULL" => Operator::IsNull,
            "IS_NOT_NULL" => Operator::IsNotNull,
            _ => Operator::Unrecognized,
        }
    }

    /// `true` for operators that never read the operand. An unrecognized
    /// operator compiles to nothing, so its operand is never read either.
    pub fn ignores_value(self) -> bool {
        matches!(
            self,
            Operator::IsNull | Operator::IsNotNull | Operator::Unrecognized
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct OperatorVisitor;

impl Visitor<'_> for OperatorVisitor {
    type Value = Operator;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an operator name or numeric operator code")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Operator, E> {
        Ok(Operator::from_name(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Operator, E> {
        Ok(Operator::from_code(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Operator, E> {
        Ok(u64::try_from(v).map_or(Operator::Unrecognized, Operator::from_code))
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OperatorVisitor)
    }
}

/// Combinator joining sibling clauses within one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[default]
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

impl Logic {
    pub fn as_str(self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction of a [`SortEntry`](super::spec::SortEntry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_codes_follow_declaration_order() {
        assert_eq!(Operator::from_code(0), Operator::Eq);
        assert_eq!(Operator::from_code(6), Operator::Between);
        assert_eq!(Operator::from_code(11), Operator::IsNotNull);
        assert_eq!(Operator::from_code(12), Operator::Unrecognized);
        assert_eq!(Operator::from_code(u64::MAX), Operator::Unrecognized);
    }

    #[test]
    fn test_operator_names() {
        assert_eq!(Operator::from_name("eq"), Operator::Eq);
        assert_eq!(Operator::from_name("not like"), Operator::NotLike);
        assert_eq!(Operator::from_name("GREATER_OR_EQUALS"), Operator::Gte);
        assert_eq!(Operator::from_name("is-not-null"), Operator::IsNotNull);
        assert_eq!(Operator::from_name("REGEX"), Operator::Unrecognized);
    }

    #[test]
    fn test_operator_serde() {
        let ops: Vec<Operator> = serde_json::from_str(r#"["NEQ", 9, "bogus", -1]"#).unwrap();
        assert_eq!(
            ops,
            vec![
                Operator::Neq,
                Operator::In,
                Operator::Unrecognized,
                Operator::Unrecognized
            ]
        );
        assert_eq!(
            serde_json::to_string(&Operator::NotLike).unwrap(),
            r#""NOT_LIKE""#
        );
    }

    #[test]
    fn test_logic_and_direction_accept_both_cases() {
        let logic: Vec<Logic> = serde_json::from_str(r#"["and", "OR"]"#).unwrap();
        assert_eq!(logic, vec![Logic::And, Logic::Or]);

        let dirs: Vec<SortDir> = serde_json::from_str(r#"["DESC", "asc"]"#).unwrap();
        assert_eq!(dirs, vec![SortDir::Desc, SortDir::Asc]);
        assert_eq!(SortDir::Desc.to_string(), "DESC");
    }
}
