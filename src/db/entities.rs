use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::pagination::{Filter, PageParams};

/// Static description of a table served by the generic CRUD surface.
/// Table and column names only ever come from these descriptors; request
/// input is always bound, never spliced into SQL.
pub struct EntityDescriptor {
    pub table: &'static str,
    pub singular: &'static str,
    /// Natural-key column used for code lookups and child-reference counts.
    pub key_column: &'static str,
    pub searchable: &'static [&'static str],
    pub sortable: &'static [&'static str],
    pub default_sort: &'static str,
    pub child_refs: &'static [ChildRef],
}

/// A child table whose rows reference the entity by its natural key and
/// therefore block deletion.
pub struct ChildRef {
    pub table: &'static str,
    pub column: &'static str,
    pub label: &'static str,
}

pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const DESC: EntityDescriptor;
}

pub async fn find_by_id<T: Entity>(pool: &PgPool, id: i64) -> Result<Option<T>, sqlx::Error> {
    let sql = format!("SELECT * FROM {} WHERE id = $1", T::DESC.table);
    sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(pool).await
}

pub async fn find_by_key<T: Entity>(pool: &PgPool, key: &str) -> Result<Option<T>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM {} WHERE {} = $1",
        T::DESC.table,
        T::DESC.key_column
    );
    sqlx::query_as::<_, T>(&sql).bind(key).fetch_optional(pool).await
}

/// Pre-flight uniqueness check producing a structured conflict naming the
/// field. Pass the row's own id when updating so a row can keep its value.
/// The UNIQUE constraints in the migrations remain the actual enforcement.
pub async fn ensure_unique(
    pool: &PgPool,
    table: &str,
    column: &str,
    value: &str,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    let sql = match exclude_id {
        Some(_) => format!("SELECT id FROM {table} WHERE {column} = $1 AND id <> $2"),
        None => format!("SELECT id FROM {table} WHERE {column} = $1"),
    };

    let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(value);
    if let Some(id) = exclude_id {
        query = query.bind(id);
    }

    if query.fetch_optional(pool).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "{column} '{value}' is already in use"
        )));
    }
    Ok(())
}

/// Count rows matching the filter.
pub async fn count(pool: &PgPool, table: &str, filter: &Filter) -> Result<i64, sqlx::Error> {
    let (where_sql, binds) = filter.to_sql(1);
    let sql = format!("SELECT COUNT(*) FROM {table}{where_sql}");

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for value in &binds {
        query = query.bind(value);
    }
    query.fetch_one(pool).await
}

/// Fetch one page matching the filter. The sort column is taken from the
/// request only when it appears in the descriptor's whitelist.
pub async fn list<T: Entity>(
    pool: &PgPool,
    filter: &Filter,
    params: &PageParams,
) -> Result<Vec<T>, sqlx::Error> {
    let desc = &T::DESC;
    let sort_col = if desc.sortable.contains(&params.sort_by.as_str()) {
        params.sort_by.as_str()
    } else {
        desc.default_sort
    };

    let (where_sql, binds) = filter.to_sql(1);
    let sql = format!(
        "SELECT * FROM {}{} ORDER BY {} {} LIMIT ${} OFFSET ${}",
        desc.table,
        where_sql,
        sort_col,
        params.sort_order.as_sql(),
        binds.len() + 1,
        binds.len() + 2,
    );

    let mut query = sqlx::query_as::<_, T>(&sql);
    for value in &binds {
        query = query.bind(value);
    }
    query
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(pool)
        .await
}

/// Delete guarded by child-reference counts on the natural key: 404 when
/// the id is absent, Conflict naming the blocking relation otherwise.
pub async fn delete<T: Entity>(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let desc = &T::DESC;

    let sql = format!("SELECT {} FROM {} WHERE id = $1", desc.key_column, desc.table);
    let key: Option<String> = sqlx::query_scalar(&sql).bind(id).fetch_optional(pool).await?;
    let Some(key) = key else {
        return Err(AppError::NotFound(format!("{} not found", desc.singular)));
    };

    for child in desc.child_refs {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1",
            child.table, child.column
        );
        let refs: i64 = sqlx::query_scalar(&sql).bind(&key).fetch_one(pool).await?;
        if refs > 0 {
            return Err(AppError::Conflict(format!(
                "{} is referenced by {} {}",
                desc.singular, refs, child.label
            )));
        }
    }

    sqlx::query(&format!("DELETE FROM {} WHERE id = $1", desc.table))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_all(pool: &PgPool, table: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
}

/// Group-by breakdown for stats endpoints.
pub async fn count_grouped(
    pool: &PgPool,
    table: &str,
    column: &str,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {column}, COUNT(*) FROM {table} GROUP BY {column} ORDER BY {column}"
    ))
    .fetch_all(pool)
    .await
}

/// How many parent rows have at least one child referencing their natural key.
pub async fn count_with_children(
    pool: &PgPool,
    parent: &EntityDescriptor,
    child: &ChildRef,
) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "SELECT COUNT(*) FROM {p} WHERE EXISTS \
         (SELECT 1 FROM {c} WHERE {c}.{cc} = {p}.{pk})",
        p = parent.table,
        c = child.table,
        cc = child.column,
        pk = parent.key_column,
    );
    sqlx::query_scalar(&sql).fetch_one(pool).await
}
