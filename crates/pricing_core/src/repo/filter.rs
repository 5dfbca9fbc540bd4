//! Boolean conditions and update expressions over entity columns.
//!
//! # Invariants
//! - Conditions combine exactly as nested; no implicit precedence.
//! - An empty `And` is true, an empty `Or` and an empty `In` are false.
//! - Comparing with `NULL` renders `IS NULL` / `IS NOT NULL`.
//! - Values are always bound parameters, identifiers are always quoted.

use super::entity::{Column, Entity, IntoValue};
use rusqlite::types::Value;
use std::ops::Not;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// A predicate over rows of entity `T`.
#[derive(Debug, Clone)]
pub enum Condition<T> {
    Compare {
        column: Column<T>,
        op: CompareOp,
        value: Value,
    },
    /// SQL `LIKE`: `%` and `_` in the pattern are wildcards.
    Like { column: Column<T>, pattern: Value },
    In { column: Column<T>, values: Vec<Value> },
    IsNull(Column<T>),
    And(Vec<Condition<T>>),
    Or(Vec<Condition<T>>),
    Not(Box<Condition<T>>),
}

impl<T> Condition<T> {
    pub fn and(conditions: impl IntoIterator<Item = Condition<T>>) -> Self {
        Self::And(conditions.into_iter().collect())
    }

    pub fn or(conditions: impl IntoIterator<Item = Condition<T>>) -> Self {
        Self::Or(conditions.into_iter().collect())
    }
}

impl<T: Entity> Condition<T> {
    pub(crate) fn render(&self, sql: &mut String, params: &mut Vec<Value>) {
        match self {
            Self::Compare { column, op, value } => match (op, value) {
                (CompareOp::Eq, Value::Null) => {
                    sql.push_str(&quote_ident(column.name()));
                    sql.push_str(" IS NULL");
                }
                (CompareOp::Ne, Value::Null) => {
                    sql.push_str(&quote_ident(column.name()));
                    sql.push_str(" IS NOT NULL");
                }
                (CompareOp::Eq | CompareOp::Ne, _) => {
                    sql.push_str(&quote_ident(column.name()));
                    sql.push(' ');
                    sql.push_str(op.as_sql());
                    sql.push_str(" ?");
                    params.push(value.clone());
                }
                _ if column.is_decimal() => {
                    sql.push_str(&column.ordering_operand());
                    sql.push(' ');
                    sql.push_str(op.as_sql());
                    sql.push_str(" CAST(? AS NUMERIC)");
                    params.push(value.clone());
                }
                _ => {
                    sql.push_str(&quote_ident(column.name()));
                    sql.push(' ');
                    sql.push_str(op.as_sql());
                    sql.push_str(" ?");
                    params.push(value.clone());
                }
            },
            Self::Like { column, pattern } => {
                sql.push_str(&quote_ident(column.name()));
                sql.push_str(" LIKE ?");
                params.push(pattern.clone());
            }
            Self::In { column, values } => {
                if values.is_empty() {
                    sql.push_str("1 = 0");
                    return;
                }
                sql.push_str(&quote_ident(column.name()));
                sql.push_str(" IN (");
                sql.push_str(&vec!["?"; values.len()].join(", "));
                sql.push(')');
                params.extend(values.iter().cloned());
            }
            Self::IsNull(column) => {
                sql.push_str(&quote_ident(column.name()));
                sql.push_str(" IS NULL");
            }
            Self::And(conditions) => render_group(conditions, " AND ", "1 = 1", sql, params),
            Self::Or(conditions) => render_group(conditions, " OR ", "1 = 0", sql, params),
            Self::Not(condition) => {
                sql.push_str("NOT (");
                condition.render(sql, params);
                sql.push(')');
            }
        }
    }
}

impl<T> Not for Condition<T> {
    type Output = Condition<T>;

    fn not(self) -> Self::Output {
        Condition::Not(Box::new(self))
    }
}

fn render_group<T: Entity>(
    conditions: &[Condition<T>],
    separator: &str,
    empty: &str,
    sql: &mut String,
    params: &mut Vec<Value>,
) {
    if conditions.is_empty() {
        sql.push_str(empty);
        return;
    }
    sql.push('(');
    for (index, condition) in conditions.iter().enumerate() {
        if index > 0 {
            sql.push_str(separator);
        }
        condition.render(sql, params);
    }
    sql.push(')');
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

/// Backend-evaluated value expression, used by set-based updates.
#[derive(Debug, Clone)]
pub enum Expr<T> {
    Value(Value),
    Column(Column<T>),
    Binary {
        op: ArithOp,
        lhs: Box<Expr<T>>,
        rhs: Box<Expr<T>>,
    },
}

impl<T> Expr<T> {
    fn binary(op: ArithOp, lhs: Expr<T>, rhs: Expr<T>) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn plus(self, value: impl IntoValue) -> Self {
        Self::binary(ArithOp::Add, self, Expr::Value(value.into_value()))
    }

    pub fn minus(self, value: impl IntoValue) -> Self {
        Self::binary(ArithOp::Sub, self, Expr::Value(value.into_value()))
    }

    pub fn times(self, value: impl IntoValue) -> Self {
        Self::binary(ArithOp::Mul, self, Expr::Value(value.into_value()))
    }

    pub(crate) fn render(&self, sql: &mut String, params: &mut Vec<Value>) {
        match self {
            Self::Value(value) => {
                sql.push('?');
                params.push(value.clone());
            }
            Self::Column(column) => sql.push_str(&quote_ident(column.name())),
            Self::Binary { op, lhs, rhs } => {
                sql.push('(');
                lhs.render(sql, params);
                sql.push_str(match op {
                    ArithOp::Add => " + ",
                    ArithOp::Sub => " - ",
                    ArithOp::Mul => " * ",
                });
                rhs.render(sql, params);
                sql.push(')');
            }
        }
    }
}

/// `column = expression` in a set-based update.
#[derive(Debug, Clone)]
pub struct Assignment<T> {
    pub column: Column<T>,
    pub expr: Expr<T>,
}

impl<T> Column<T> {
    fn compare(self, op: CompareOp, value: impl IntoValue) -> Condition<T> {
        Condition::Compare {
            column: self,
            op,
            value: value.into_value(),
        }
    }

    pub fn eq(self, value: impl IntoValue) -> Condition<T> {
        self.compare(CompareOp::Eq, value)
    }

    pub fn ne(self, value: impl IntoValue) -> Condition<T> {
        self.compare(CompareOp::Ne, value)
    }

    pub fn lt(self, value: impl IntoValue) -> Condition<T> {
        self.compare(CompareOp::Lt, value)
    }

    pub fn le(self, value: impl IntoValue) -> Condition<T> {
        self.compare(CompareOp::Le, value)
    }

    pub fn gt(self, value: impl IntoValue) -> Condition<T> {
        self.compare(CompareOp::Gt, value)
    }

    pub fn ge(self, value: impl IntoValue) -> Condition<T> {
        self.compare(CompareOp::Ge, value)
    }

    pub fn like(self, pattern: impl IntoValue) -> Condition<T> {
        Condition::Like {
            column: self,
            pattern: pattern.into_value(),
        }
    }

    pub fn is_in<V: IntoValue>(self, values: impl IntoIterator<Item = V>) -> Condition<T> {
        Condition::In {
            column: self,
            values: values.into_iter().map(IntoValue::into_value).collect(),
        }
    }

    pub fn is_null(self) -> Condition<T> {
        Condition::IsNull(self)
    }

    pub fn expr(self) -> Expr<T> {
        Expr::Column(self)
    }

    pub fn plus(self, value: impl IntoValue) -> Expr<T> {
        self.expr().plus(value)
    }

    pub fn minus(self, value: impl IntoValue) -> Expr<T> {
        self.expr().minus(value)
    }

    pub fn times(self, value: impl IntoValue) -> Expr<T> {
        self.expr().times(value)
    }

    pub fn set(self, value: impl IntoValue) -> Assignment<T> {
        self.set_expr(Expr::Value(value.into_value()))
    }

    pub fn set_expr(self, expr: Expr<T>) -> Assignment<T> {
        Assignment { column: self, expr }
    }
}

impl<T: Entity> Column<T> {
    pub(crate) fn is_decimal(self) -> bool {
        T::DECIMAL_COLUMNS.contains(&self.name())
    }

    /// Column as it takes part in range comparisons and `ORDER BY`.
    pub(crate) fn ordering_operand(self) -> String {
        if self.is_decimal() {
            format!("CAST({} AS NUMERIC)", quote_ident(self.name()))
        } else {
            quote_ident(self.name())
        }
    }
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::{quote_ident, Condition};
    use crate::model::{Chain, Item};
    use rusqlite::types::Value;

    fn render(condition: &Condition<Chain>) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        condition.render(&mut sql, &mut params);
        (sql, params)
    }

    #[test]
    fn nested_groups_keep_explicit_structure() {
        let condition = Condition::and([
            Chain::FULL_ID.eq(100),
            Condition::or([Chain::SUBCHAIN_ID.eq(0), Chain::NAME.like("Ac%")]),
        ]);
        let (sql, params) = render(&condition);
        assert_eq!(
            sql,
            "(\"full_id\" = ? AND (\"subchain_id\" = ? OR \"name\" LIKE ?))"
        );
        assert_eq!(
            params,
            vec![
                Value::Integer(100),
                Value::Integer(0),
                Value::Text("Ac%".to_string())
            ]
        );
    }

    #[test]
    fn empty_groups_have_fixed_truth_values() {
        assert_eq!(render(&Condition::and([])).0, "1 = 1");
        assert_eq!(render(&Condition::or([])).0, "1 = 0");
        assert_eq!(render(&Chain::ID.is_in(Vec::<i64>::new())).0, "1 = 0");
    }

    #[test]
    fn null_comparison_renders_is_null() {
        let (sql, params) = render(&Chain::NAME.eq(None::<String>));
        assert_eq!(sql, "\"name\" IS NULL");
        assert!(params.is_empty());
        assert_eq!(render(&!Chain::NAME.is_null()).0, "NOT (\"name\" IS NULL)");
    }

    #[test]
    fn update_expression_references_current_value() {
        let mut sql = String::new();
        let mut params = Vec::new();
        Chain::SUBCHAIN_ID.plus(1).render(&mut sql, &mut params);
        assert_eq!(sql, "(\"subchain_id\" + ?)");
        assert_eq!(params, vec![Value::Integer(1)]);
    }

    #[test]
    fn decimal_range_comparisons_are_numeric() {
        let mut sql = String::new();
        let mut params = Vec::new();
        Item::QUANTITY.gt(5).render(&mut sql, &mut params);
        assert_eq!(sql, "CAST(\"quantity\" AS NUMERIC) > CAST(? AS NUMERIC)");
        assert_eq!(params, vec![Value::Integer(5)]);

        let mut sql = String::new();
        Item::QUANTITY.eq("9").render(&mut sql, &mut params);
        assert_eq!(sql, "\"quantity\" = ?");
        assert_eq!(Item::CODE.ordering_operand(), "\"code\"");
    }

    #[test]
    fn identifiers_escape_quotes() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
