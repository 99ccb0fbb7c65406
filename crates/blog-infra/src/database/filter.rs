//! Translation of store filters into SeaORM conditions.

use sea_orm::Condition;
use sea_orm::sea_query::{Alias, Expr, SimpleExpr};

use blog_core::ports::{Filter, Value};

pub(crate) fn sea_value(value: &Value) -> sea_orm::Value {
    match value {
        Value::Null => sea_orm::Value::String(None),
        Value::Bool(b) => (*b).into(),
        Value::Int(i) => (*i).into(),
        Value::Text(s) => s.clone().into(),
        Value::Timestamp(t) => (*t).into(),
        Value::Json(j) => j.clone().into(),
    }
}

fn column(name: &str) -> Expr {
    Expr::col(Alias::new(name))
}

fn expr(filter: &Filter) -> Option<SimpleExpr> {
    Some(match filter {
        Filter::All | Filter::And(_) => return None,
        Filter::Eq(name, Value::Null) => column(name).is_null(),
        Filter::Eq(name, value) => column(name).eq(sea_value(value)),
        Filter::In(name, values) => column(name).is_in(values.iter().map(sea_value)),
        Filter::IsNull(name) => column(name).is_null(),
        Filter::IsNotNull(name) => column(name).is_not_null(),
        Filter::Raw { sql, args } => {
            Expr::cust_with_values(sql.as_str(), args.iter().map(sea_value))
        }
    })
}

/// Build the WHERE condition for `filter`. `Filter::All` matches every row.
pub(crate) fn condition(filter: &Filter) -> Condition {
    match filter {
        Filter::All => Condition::all(),
        Filter::And(filters) => filters
            .iter()
            .fold(Condition::all(), |cond, f| cond.add(condition(f))),
        f => match expr(f) {
            Some(e) => Condition::all().add(e),
            None => Condition::all(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{PostgresQueryBuilder, Query};

    fn render(filter: &Filter) -> String {
        Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("posts"))
            .cond_where(condition(filter))
            .to_string(PostgresQueryBuilder)
    }

    #[test]
    fn test_all_has_no_where_clause() {
        assert_eq!(render(&Filter::All), r#"SELECT "id" FROM "posts""#);
    }

    #[test]
    fn test_conjunction_of_eq_and_not_null() {
        let filter = Filter::eq("author_id", "u1").and(Filter::is_not_null("published_at"));
        assert_eq!(
            render(&filter),
            r#"SELECT "id" FROM "posts" WHERE "author_id" = 'u1' AND "published_at" IS NOT NULL"#
        );
    }

    #[test]
    fn test_in_list() {
        let filter = Filter::is_in("id", ["a", "b"]);
        assert_eq!(
            render(&filter),
            r#"SELECT "id" FROM "posts" WHERE "id" IN ('a', 'b')"#
        );
    }
}
