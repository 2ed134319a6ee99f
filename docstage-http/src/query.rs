//! Query translation from the docstage AST to the remote query language.
//!
//! This module renders abstract query expressions into the filter strings
//! the remote's query endpoint executes. Values are embedded as JSON
//! literals, so string escaping follows JSON rules.

use serde_json::Value;

use docstage_core::{
    error::{StoreError, StoreResult},
    query::{Expr, FieldOp, Query, QueryVisitor, SortDirection},
};

fn literal(value: &Value) -> StoreResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn match_pattern(field: &str, pattern: String) -> StoreResult<String> {
    Ok(format!("{} match {}", field, literal(&Value::String(pattern))?))
}

/// Translates query expressions into remote filter strings.
///
/// Implements [`QueryVisitor`] the same way a database backend would
/// translate into its native query syntax; the output composes into the
/// `*[...]` root the client builds around it.
pub(crate) struct QueryTranslator;

impl QueryVisitor for QueryTranslator {
    type Output = String;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(format!(
            "({})",
            exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?
                .join(" && "),
        ))
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(format!(
            "({})",
            exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?
                .join(" || "),
        ))
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(format!("!({})", self.visit_expr(expr)?))
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(if should_exist {
            format!("defined({})", field)
        } else {
            format!("!defined({})", field)
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Value) -> Result<Self::Output, Self::Error> {
        Ok(match op {
            FieldOp::Eq => format!("{} == {}", field, literal(value)?),
            FieldOp::Ne => format!("{} != {}", field, literal(value)?),
            FieldOp::Gt => format!("{} > {}", field, literal(value)?),
            FieldOp::Gte => format!("{} >= {}", field, literal(value)?),
            FieldOp::Lt => format!("{} < {}", field, literal(value)?),
            FieldOp::Lte => format!("{} <= {}", field, literal(value)?),
            FieldOp::Contains => match value {
                Value::String(s) => match_pattern(field, format!("*{}*", s))?,
                Value::Array(_) => {
                    return Err(StoreError::Remote(
                        "Contains operator requires a scalar value".to_string(),
                    ));
                }
                other => format!("{} in {}", literal(other)?, field),
            },
            FieldOp::NotContains => match value {
                Value::String(s) => format!("!({})", match_pattern(field, format!("*{}*", s))?),
                Value::Array(_) => {
                    return Err(StoreError::Remote(
                        "NotContains operator requires a scalar value".to_string(),
                    ));
                }
                other => format!("!({} in {})", literal(other)?, field),
            },
            FieldOp::StartsWith => match value {
                Value::String(s) => match_pattern(field, format!("{}*", s))?,
                _ => {
                    return Err(StoreError::Remote(
                        "StartsWith operator requires a string value".to_string(),
                    ));
                }
            },
            FieldOp::EndsWith => match value {
                Value::String(s) => match_pattern(field, format!("*{}", s))?,
                _ => {
                    return Err(StoreError::Remote(
                        "EndsWith operator requires a string value".to_string(),
                    ));
                }
            },
            FieldOp::AnyOf => match value {
                Value::Array(_) => {
                    format!("count({}[@ in {}]) > 0", field, literal(value)?)
                }
                other => format!("{} in {}", literal(other)?, field),
            },
            FieldOp::NoneOf => match value {
                Value::Array(_) => {
                    format!("count({}[@ in {}]) == 0", field, literal(value)?)
                }
                other => format!("!({} in {})", literal(other)?, field),
            },
        })
    }
}

/// Renders a full query rooted at the given document-type constraint.
pub(crate) fn render(query: &Query, doc_type: &str) -> StoreResult<String> {
    let mut filter = format!("_type == {}", literal(&Value::String(doc_type.to_string()))?);
    if let Some(expr) = &query.filter {
        filter = format!("{} && {}", filter, QueryTranslator.visit_expr(expr)?);
    }

    let mut rendered = format!("*[{}]", filter);

    if let Some(sort) = &query.sort {
        let direction = match sort.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        rendered.push_str(&format!(" | order({} {})", sort.field, direction));
    }

    match (query.offset, query.limit) {
        (None, None) => {}
        (offset, limit) => {
            let start = offset.unwrap_or(0);
            match limit {
                Some(limit) => rendered.push_str(&format!("[{}...{}]", start, start + limit)),
                None => rendered.push_str(&format!("[{}..-1]", start)),
            }
        }
    }

    Ok(rendered)
}
