use sqlx::PgPool;

use crate::db::entities::{Entity, EntityDescriptor};
use crate::models::User;

impl Entity for User {
    const DESC: EntityDescriptor = EntityDescriptor {
        table: "users",
        singular: "User",
        key_column: "code",
        searchable: &["name", "email", "username", "code"],
        sortable: &["name", "email", "username", "code", "role", "created_at"],
        default_sort: "created_at",
        child_refs: &[],
    };
}

pub struct NewUser<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub phone: &'a str,
    pub address: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: &'a str,
}

pub async fn create(pool: &PgPool, user: &NewUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (code, name, email, username, phone, address, password_hash, role)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(user.code)
    .bind(user.name)
    .bind(user.email)
    .bind(user.username)
    .bind(user.phone)
    .bind(user.address)
    .bind(user.password_hash)
    .bind(user.role)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Partial update; None leaves a column untouched.
#[derive(Debug, Default)]
pub struct UserChanges<'a> {
    pub code: Option<&'a str>,
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub username: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub role: Option<&'a str>,
    pub expense_limit: Option<i64>,
    pub discount_limit: Option<i64>,
    pub point: Option<i64>,
    pub balance: Option<i64>,
}

pub async fn update(pool: &PgPool, id: i64, changes: &UserChanges<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET
            code = COALESCE($2, code),
            name = COALESCE($3, name),
            email = COALESCE($4, email),
            username = COALESCE($5, username),
            phone = COALESCE($6, phone),
            address = COALESCE($7, address),
            role = COALESCE($8, role),
            expense_limit = COALESCE($9, expense_limit),
            discount_limit = COALESCE($10, discount_limit),
            point = COALESCE($11, point),
            balance = COALESCE($12, balance),
            updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(changes.code)
    .bind(changes.name)
    .bind(changes.email)
    .bind(changes.username)
    .bind(changes.phone)
    .bind(changes.address)
    .bind(changes.role)
    .bind(changes.expense_limit)
    .bind(changes.discount_limit)
    .bind(changes.point)
    .bind(changes.balance)
    .fetch_one(pool)
    .await
}

pub async fn update_password(
    pool: &PgPool,
    id: i64,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
