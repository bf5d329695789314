//! SQL rendering for listing predicates.
//!
//! Properties are stored as JSONB documents in `properties.doc`. Each
//! predicate leaf becomes a condition over a JSONB path, with every user
//! value passed as a positional bind parameter.

use homestead_query::{Condition, Field, Op, Predicate, SortField, SortSpec};
use serde_json::Value as JsonValue;

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Float(f64),
    Int(i64),
    Json(JsonValue),
}

fn push(bind_params: &mut Vec<BindValue>, value: BindValue) -> usize {
    bind_params.push(value);
    bind_params.len()
}

/// `doc #> '{specifications,bedrooms}'`
fn json_path(field: Field) -> String {
    let path: Vec<&str> = field.segments().collect();
    format!("p.doc #> '{{{}}}'", path.join(","))
}

/// `doc #>> '{...}'`, the value as text.
fn text_path(field: Field) -> String {
    let path: Vec<&str> = field.segments().collect();
    format!("p.doc #>> '{{{}}}'", path.join(","))
}

/// Numeric value of `field`, or NULL when the stored value is not a number.
fn numeric_path(field: Field) -> String {
    format!(
        "(CASE WHEN jsonb_typeof({}) = 'number' THEN ({})::float8 END)",
        json_path(field),
        text_path(field)
    )
}

pub fn build_where(predicate: &Predicate, bind_params: &mut Vec<BindValue>) -> String {
    match predicate {
        Predicate::And(children) => join(children, " AND ", "TRUE", bind_params),
        Predicate::Or(children) => join(children, " OR ", "FALSE", bind_params),
        Predicate::Cond(condition) => build_condition(condition, bind_params),
    }
}

fn join(
    children: &[Predicate],
    separator: &str,
    empty: &str,
    bind_params: &mut Vec<BindValue>,
) -> String {
    if children.is_empty() {
        return empty.to_string();
    }
    let parts: Vec<String> = children
        .iter()
        .map(|child| build_where(child, bind_params))
        .collect();
    format!("({})", parts.join(separator))
}

fn build_condition(condition: &Condition, bind_params: &mut Vec<BindValue>) -> String {
    let field = condition.field;
    match &condition.op {
        Op::Eq(scalar) => {
            let idx = push(bind_params, BindValue::Json(scalar.to_json()));
            format!("COALESCE({} = ${}::jsonb, FALSE)", json_path(field), idx)
        }
        Op::Range(range) => {
            let value = numeric_path(field);
            let mut parts = vec![format!("{value} IS NOT NULL")];
            if let Some(gte) = range.gte {
                let idx = push(bind_params, BindValue::Float(gte));
                parts.push(format!("{value} >= ${idx}"));
            }
            if let Some(lte) = range.lte {
                let idx = push(bind_params, BindValue::Float(lte));
                parts.push(format!("{value} <= ${idx}"));
            }
            format!("COALESCE({}, FALSE)", parts.join(" AND "))
        }
        Op::Matches(pattern) => {
            let idx = push(bind_params, BindValue::Text(pattern.regex_source()));
            format!(
                "(jsonb_typeof({}) = 'string' AND {} ~* ${})",
                json_path(field),
                text_path(field),
                idx
            )
        }
        Op::ContainsAll(values) => {
            let idx = push(bind_params, BindValue::Json(JsonValue::from(values.clone())));
            format!(
                "(jsonb_typeof({path}) = 'array' AND {path} @> ${idx}::jsonb)",
                path = json_path(field)
            )
        }
    }
}

/// `ORDER BY` body. Missing values sort last in both directions; ties fall
/// back to the id so pages are stable.
pub fn build_order_by(sort: SortSpec) -> String {
    let expr = match sort.field {
        SortField::CreatedAt => "p.created_at".to_string(),
        SortField::UpdatedAt => "p.updated_at".to_string(),
        other => numeric_path(other.field()),
    };
    let direction = if sort.order.is_ascending() {
        "ASC"
    } else {
        "DESC"
    };
    format!("{expr} {direction} NULLS LAST, p.id ASC")
}

/// Binds `bind_params` in order onto a scalar query.
pub fn apply_binds<'q, O>(
    mut query: sqlx::query::QueryScalar<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_params: Vec<BindValue>,
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for value in bind_params {
        query = match value {
            BindValue::Text(v) => query.bind(v),
            BindValue::Float(v) => query.bind(v),
            BindValue::Int(v) => query.bind(v),
            BindValue::Json(v) => query.bind(v),
        };
    }
    query
}
