//! Typed predicate tree.
//!
//! A compiled filter is an AND/OR tree over leaf [`Condition`]s. Backends
//! either walk the tree themselves (SQL rendering) or use the helpers here:
//! [`Predicate::matches`] evaluates against a JSON document and
//! [`Predicate::to_document`] renders the canonical Mongo-style form used in
//! logs and assertions.

use crate::field::Field;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => number_json(*n),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Bool(b), Value::Bool(v)) => b == v,
            (Self::Number(n), Value::Number(v)) => v.as_f64() == Some(*n),
            (Self::Text(s), Value::String(v)) => s == v,
            _ => false,
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Closed numeric interval; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    pub gte: Option<f64>,
    pub lte: Option<f64>,
}

impl Range {
    pub fn new(gte: Option<f64>, lte: Option<f64>) -> Self {
        Self { gte, lte }
    }

    pub fn at_least(value: f64) -> Self {
        Self::new(Some(value), None)
    }

    pub fn at_most(value: f64) -> Self {
        Self::new(None, Some(value))
    }

    pub fn is_unbounded(&self) -> bool {
        self.gte.is_none() && self.lte.is_none()
    }

    /// Lays `other` over `self`: every bound `other` defines wins, the rest
    /// is kept.
    pub fn merged_with(self, other: Range) -> Range {
        Range {
            gte: other.gte.or(self.gte),
            lte: other.lte.or(self.lte),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.gte.map_or(true, |min| value >= min) && self.lte.map_or(true, |max| value <= max)
    }

    fn to_document(self) -> Value {
        let mut doc = Map::new();
        if let Some(min) = self.gte {
            doc.insert("$gte".to_string(), number_json(min));
        }
        if let Some(max) = self.lte {
            doc.insert("$lte".to_string(), number_json(max));
        }
        Value::Object(doc)
    }
}

/// Case-insensitive literal substring match.
///
/// User text is never interpreted as a regular expression; backends that
/// need a pattern get the escaped form from [`TextPattern::regex_source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPattern {
    needle: String,
}

impl TextPattern {
    pub fn literal(text: &str) -> Self {
        Self {
            needle: text.to_string(),
        }
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn regex_source(&self) -> String {
        regex::escape(&self.needle)
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        haystack
            .to_lowercase()
            .contains(&self.needle.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Eq(Scalar),
    Range(Range),
    Matches(TextPattern),
    /// Array field must contain every listed value.
    ContainsAll(Vec<String>),
}

impl Op {
    fn to_document(&self) -> Value {
        match self {
            Self::Eq(scalar) => scalar.to_json(),
            Self::Range(range) => range.to_document(),
            Self::Matches(pattern) => serde_json::json!({
                "$regex": pattern.regex_source(),
                "$options": "i",
            }),
            Self::ContainsAll(values) => serde_json::json!({ "$all": values }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: Field,
    pub op: Op,
}

impl Condition {
    pub fn new(field: Field, op: Op) -> Self {
        Self { field, op }
    }

    pub fn matches(&self, doc: &Value) -> bool {
        let Some(value) = lookup(doc, self.field) else {
            return false;
        };

        match &self.op {
            Op::Eq(scalar) => scalar.matches(value),
            Op::Range(range) => value.as_f64().is_some_and(|n| range.contains(n)),
            Op::Matches(pattern) => value.as_str().is_some_and(|s| pattern.is_match(s)),
            Op::ContainsAll(wanted) => match value.as_array() {
                Some(items) => wanted
                    .iter()
                    .all(|w| items.iter().any(|item| item.as_str() == Some(w.as_str()))),
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Cond(Condition),
}

impl Predicate {
    /// Evaluates the predicate against a JSON document.
    ///
    /// An empty `And` matches everything, an empty `Or` matches nothing.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Self::And(children) => children.iter().all(|c| c.matches(doc)),
            Self::Or(children) => children.iter().any(|c| c.matches(doc)),
            Self::Cond(condition) => condition.matches(doc),
        }
    }

    /// Leaf conditions in depth-first order.
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_conditions(out);
                }
            }
            Self::Cond(condition) => out.push(condition),
        }
    }

    /// Canonical Mongo-style rendering.
    ///
    /// Conditions of an `And` become keys of one object; a nested `Or`
    /// becomes `$or` and a nested `And` becomes `$and`. Anything that would
    /// collide with an existing key is appended to `$and`.
    pub fn to_document(&self) -> Value {
        match self {
            Self::Cond(condition) => {
                let mut doc = Map::new();
                doc.insert(condition.field.path().to_string(), condition.op.to_document());
                Value::Object(doc)
            }
            Self::Or(children) => serde_json::json!({
                "$or": children.iter().map(Predicate::to_document).collect::<Vec<_>>(),
            }),
            Self::And(children) => {
                let mut doc = Map::new();
                let mut overflow = Vec::new();

                for child in children {
                    match child {
                        Self::Cond(condition) if !doc.contains_key(condition.field.path()) => {
                            doc.insert(
                                condition.field.path().to_string(),
                                condition.op.to_document(),
                            );
                        }
                        Self::Or(_) if !doc.contains_key("$or") => {
                            if let Value::Object(rendered) = child.to_document() {
                                doc.extend(rendered);
                            }
                        }
                        Self::And(inner) if !doc.contains_key("$and") => {
                            doc.insert(
                                "$and".to_string(),
                                Value::Array(inner.iter().map(Predicate::to_document).collect()),
                            );
                        }
                        other => overflow.push(other.to_document()),
                    }
                }

                if !overflow.is_empty() {
                    match doc.get_mut("$and") {
                        Some(Value::Array(existing)) => existing.extend(overflow),
                        _ => {
                            doc.insert("$and".to_string(), Value::Array(overflow));
                        }
                    }
                }

                Value::Object(doc)
            }
        }
    }
}

/// Resolves a dotted field path inside a JSON document.
pub(crate) fn lookup(doc: &Value, field: Field) -> Option<&Value> {
    field
        .segments()
        .try_fold(doc, |current, key| current.get(key))
        .filter(|v| !v.is_null())
}

/// Integral values render as JSON integers so `5.0` prints as `5`.
fn number_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing() -> Value {
        json!({
            "title": "Sunny Loft Downtown",
            "type": "apartment",
            "price": 250000,
            "isActive": true,
            "location": { "city": "Austin", "state": "TX" },
            "specifications": { "bedrooms": 2 },
            "amenities": ["pool", "gym", "parking"]
        })
    }

    #[test]
    fn eq_compares_by_json_type() {
        let doc = listing();
        assert!(Condition::new(Field::Type, Op::Eq("apartment".into())).matches(&doc));
        assert!(Condition::new(Field::IsActive, Op::Eq(true.into())).matches(&doc));
        assert!(Condition::new(Field::Bedrooms, Op::Eq(2i64.into())).matches(&doc));
        assert!(!Condition::new(Field::Bedrooms, Op::Eq("2".into())).matches(&doc));
    }

    #[test]
    fn missing_fields_never_match() {
        let doc = listing();
        let cond = Condition::new(Field::YearBuilt, Op::Range(Range::at_least(1900.0)));
        assert!(!cond.matches(&doc));
    }

    #[test]
    fn text_pattern_is_literal_and_case_insensitive() {
        let pattern = TextPattern::literal("LOFT");
        assert!(pattern.is_match("Sunny Loft Downtown"));

        let dotted = TextPattern::literal("a.b");
        assert!(!dotted.is_match("axb"));
        assert_eq!(dotted.regex_source(), "a\\.b");
    }

    #[test]
    fn contains_all_requires_every_value() {
        let doc = listing();
        let both = Condition::new(
            Field::Amenities,
            Op::ContainsAll(vec!["pool".into(), "gym".into()]),
        );
        let extra = Condition::new(
            Field::Amenities,
            Op::ContainsAll(vec!["pool".into(), "elevator".into()]),
        );
        assert!(both.matches(&doc));
        assert!(!extra.matches(&doc));
    }

    #[test]
    fn range_merge_keeps_bounds_the_overlay_leaves_open() {
        let explicit = Range::new(Some(150_000.0), Some(400_000.0));
        let merged = explicit.merged_with(Range::at_least(500_000.0));
        assert_eq!(merged, Range::new(Some(500_000.0), Some(400_000.0)));
    }

    #[test]
    fn and_of_ors_renders_under_and_key() {
        let text = Predicate::Or(vec![Predicate::Cond(Condition::new(
            Field::Title,
            Op::Matches(TextPattern::literal("loft")),
        ))]);
        let place = Predicate::Or(vec![Predicate::Cond(Condition::new(
            Field::City,
            Op::Matches(TextPattern::literal("Austin")),
        ))]);
        let filter = Predicate::And(vec![
            Predicate::Cond(Condition::new(Field::IsActive, Op::Eq(true.into()))),
            Predicate::And(vec![text, place]),
        ]);

        assert_eq!(
            filter.to_document(),
            json!({
                "isActive": true,
                "$and": [
                    { "$or": [ { "title": { "$regex": "loft", "$options": "i" } } ] },
                    { "$or": [ { "location.city": { "$regex": "Austin", "$options": "i" } } ] }
                ]
            })
        );
    }

    #[test]
    fn empty_and_matches_everything_and_empty_or_nothing() {
        let doc = listing();
        assert!(Predicate::And(vec![]).matches(&doc));
        assert!(!Predicate::Or(vec![]).matches(&doc));
    }

    #[test]
    fn fractional_numbers_keep_their_fraction() {
        assert_eq!(number_json(1.5), json!(1.5));
        assert_eq!(number_json(5.0), json!(5));
    }
}
