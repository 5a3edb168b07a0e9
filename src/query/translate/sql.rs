use super::super::{
    Direction, Order, Page, Selection,
    predicate::{Conjunction, Predicate, Test},
};
use crate::{
    errors::ExampleError,
    record::{Kind, Record, Value},
};

/// A piece of SQL with `?` placeholders and the values to bind to them, in order.
///
/// Identifiers (table and column names) are taken from the static schema and written inline,
/// quoted; every value coming from an example is bound.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SqlFragment {
    /// The SQL text.
    pub sql: String,
    /// Values for the placeholders in `sql`.
    pub binds: Vec<Value>,
}

impl SqlFragment {
    /// Returns `true` if there is no SQL text.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Translate predicates into an SQL condition suitable for a `WHERE` clause.
///
/// The translation is total and has the same semantics as [`Query::evaluate`]: null never
/// satisfies an equality or substring test, and case is folded for ASCII only.
///
/// [`Query::evaluate`]: super::super::Query::evaluate
pub trait ToSql {
    /// The condition. Empty if there is nothing to constrain.
    fn to_sql(&self) -> SqlFragment;
}

impl ToSql for Predicate {
    #[inline]
    fn to_sql(&self) -> SqlFragment {
        let Self { field, test } = self;
        let column = quote(field.name);
        match test {
            Test::IsNull => SqlFragment {
                sql: format!("{column} IS NULL"),
                binds: Vec::new(),
            },
            Test::Eq(operand) => SqlFragment {
                sql: format!("{column} = ?"),
                binds: vec![operand.clone()],
            },
            // `instr` rather than `LIKE` so that `%` and `_` in the needle are literal.
            Test::Contains {
                needle,
                ignore_case: true,
            } => SqlFragment {
                sql: format!("instr(lower({column}), ?) > 0"),
                binds: vec![Value::Text(needle.clone())],
            },
            Test::Contains {
                needle,
                ignore_case: false,
            } => SqlFragment {
                sql: format!("instr({column}, ?) > 0"),
                binds: vec![Value::Text(needle.clone())],
            },
        }
    }
}

impl<R> ToSql for Conjunction<R> {
    /// Joins the conditions of all predicates with `AND`.
    #[inline]
    fn to_sql(&self) -> SqlFragment {
        let mut conditions = Vec::with_capacity(self.predicates().len());
        let mut binds = Vec::new();
        for predicate in self.predicates() {
            let mut fragment = predicate.to_sql();
            conditions.push(fragment.sql);
            binds.append(&mut fragment.binds);
        }
        SqlFragment {
            sql: conditions.join(" AND "),
            binds,
        }
    }
}

/// `identifier` as a quoted SQL identifier. Embedded quotes are doubled.
#[inline]
#[must_use]
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// The `ORDER BY` clause for `order`, always ending in the primary key so ties are stable.
///
/// # Errors
///
/// Returns [`ExampleError::UnknownField`] if `R` does not declare the ordering field.
#[inline]
pub fn order_clause<R>(order: Option<&Order>) -> Result<String, ExampleError>
where
    R: Record,
{
    let id = quote(R::ID);
    let Some(order) = order else {
        return Ok(format!("ORDER BY {id} ASC"));
    };
    let field = order.resolve::<R>()?;
    let direction = match order.direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    };
    if field.name == R::ID {
        Ok(format!("ORDER BY {id} {direction}"))
    } else {
        Ok(format!("ORDER BY {} {direction}, {id} ASC", quote(field.name)))
    }
}

/// The `LIMIT`/`OFFSET` clause for `page`, empty if there is none.
///
/// SQLite integers are 64-bit: a limit beyond [`i64::MAX`] becomes `-1` (no limit) and an offset
/// beyond it is clamped, which skips everything just the same.
#[inline]
#[must_use]
pub fn page_clause(page: Option<Page>) -> String {
    page.map_or_else(String::new, |Page { offset, limit }| {
        let limit = i64::try_from(limit).unwrap_or(-1);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        format!("LIMIT {limit} OFFSET {offset}")
    })
}

/// The comma-separated column list of `R`, in declaration order.
fn columns<R>() -> String
where
    R: Record,
{
    R::FIELDS
        .iter()
        .map(|field| quote(field.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Append ` WHERE <condition>` to `sql` unless the condition is empty.
fn push_where(sql: &mut String, condition: &SqlFragment) {
    if !condition.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&condition.sql);
    }
}

/// A `SELECT` statement answering `selection`.
///
/// # Errors
///
/// Returns [`ExampleError::UnknownField`] if the ordering names an undeclared field.
#[inline]
pub fn select_statement<R>(selection: &Selection<R>) -> Result<SqlFragment, ExampleError>
where
    R: Record,
{
    let condition = selection.filter.to_sql();
    let mut sql = format!("SELECT {} FROM {}", columns::<R>(), quote(R::ENTITY));
    push_where(&mut sql, &condition);
    sql.push(' ');
    sql.push_str(&order_clause::<R>(selection.order.as_ref())?);
    let page = page_clause(selection.page);
    if !page.is_empty() {
        sql.push(' ');
        sql.push_str(&page);
    }
    Ok(SqlFragment {
        sql,
        binds: condition.binds,
    })
}

/// A `SELECT COUNT(*)` statement over the records matching `filter`.
#[inline]
#[must_use]
pub fn count_statement<R>(filter: &Conjunction<R>) -> SqlFragment
where
    R: Record,
{
    let condition = filter.to_sql();
    let mut sql = format!("SELECT COUNT(*) FROM {}", quote(R::ENTITY));
    push_where(&mut sql, &condition);
    SqlFragment {
        sql,
        binds: condition.binds,
    }
}

/// An `INSERT` statement for `record`, leaving the identity column to the database.
#[inline]
#[must_use]
pub fn insert_statement<R>(record: &R) -> SqlFragment
where
    R: Record,
{
    let table = quote(R::ENTITY);
    let fields = R::FIELDS
        .iter()
        .filter(|field| field.name != R::ID)
        .collect::<Vec<_>>();
    if fields.is_empty() {
        return SqlFragment {
            sql: format!("INSERT INTO {table} DEFAULT VALUES"),
            binds: Vec::new(),
        };
    }
    let columns = fields
        .iter()
        .map(|field| quote(field.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; fields.len()].join(", ");
    SqlFragment {
        sql: format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})"),
        binds: fields
            .iter()
            .map(|field| record.get(field.name).unwrap_or_default())
            .collect(),
    }
}

/// A `CREATE TABLE IF NOT EXISTS` statement for `R`.
///
/// The identity column is `AUTOINCREMENT` so that identifiers are never reused.
#[inline]
#[must_use]
pub fn create_table_statement<R>() -> String
where
    R: Record,
{
    let columns = R::FIELDS
        .iter()
        .map(|field| {
            let column = quote(field.name);
            if field.name == R::ID {
                return format!("{column} INTEGER PRIMARY KEY AUTOINCREMENT");
            }
            let kind = match field.kind {
                Kind::Int => "INTEGER",
                Kind::Text => "TEXT",
            };
            if field.nullable {
                format!("{column} {kind}")
            } else {
                format!("{column} {kind} NOT NULL")
            }
        })
        .collect::<Vec<_>>()
        .join(",\n    ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {columns}\n)",
        quote(R::ENTITY)
    )
}
