use sqlx::PgPool;

use crate::db::entities::{ChildRef, Entity, EntityDescriptor};
use crate::models::{
    AccountNumber, Bank, Branch, ChequeFailStatus, Color, Phone, ReimbursementType, UserPermission,
};

impl Entity for Bank {
    const DESC: EntityDescriptor = EntityDescriptor {
        table: "banks",
        singular: "Bank",
        key_column: "code",
        searchable: &["code", "name"],
        sortable: &["code", "name", "created_at"],
        default_sort: "created_at",
        child_refs: &[ChildRef {
            table: "account_numbers",
            column: "bank_code",
            label: "account numbers",
        }],
    };
}

impl Entity for AccountNumber {
    const DESC: EntityDescriptor = EntityDescriptor {
        table: "account_numbers",
        singular: "Account number",
        key_column: "number",
        searchable: &["number", "holder"],
        sortable: &["number", "holder", "bank_code", "created_at"],
        default_sort: "created_at",
        child_refs: &[],
    };
}

impl Entity for Branch {
    const DESC: EntityDescriptor = EntityDescriptor {
        table: "branches",
        singular: "Branch",
        key_column: "code",
        searchable: &["code", "name"],
        sortable: &["code", "name", "price_type", "created_at"],
        default_sort: "created_at",
        child_refs: &[],
    };
}

impl Entity for Color {
    const DESC: EntityDescriptor = EntityDescriptor {
        table: "colors",
        singular: "Color",
        key_column: "code",
        searchable: &["code", "name"],
        sortable: &["code", "name", "created_at"],
        default_sort: "created_at",
        child_refs: &[],
    };
}

impl Entity for Phone {
    const DESC: EntityDescriptor = EntityDescriptor {
        table: "phones",
        singular: "Phone",
        key_column: "number",
        searchable: &["number", "owner"],
        sortable: &["number", "owner", "module", "created_at"],
        default_sort: "created_at",
        child_refs: &[],
    };
}

impl Entity for ReimbursementType {
    const DESC: EntityDescriptor = EntityDescriptor {
        table: "reimbursement_types",
        singular: "Reimbursement type",
        key_column: "code",
        searchable: &["code", "name"],
        sortable: &["code", "name", "created_at"],
        default_sort: "created_at",
        child_refs: &[],
    };
}

impl Entity for UserPermission {
    const DESC: EntityDescriptor = EntityDescriptor {
        table: "user_permissions",
        singular: "User permission",
        key_column: "module",
        searchable: &["role", "module"],
        sortable: &["role", "module", "created_at"],
        default_sort: "created_at",
        child_refs: &[],
    };
}

impl Entity for ChequeFailStatus {
    const DESC: EntityDescriptor = EntityDescriptor {
        table: "cheque_fail_statuses",
        singular: "Cheque fail status",
        key_column: "code",
        searchable: &["code", "name"],
        sortable: &["code", "name", "created_at"],
        default_sort: "created_at",
        child_refs: &[],
    };
}

pub async fn create_bank(pool: &PgPool, code: &str, name: &str) -> Result<Bank, sqlx::Error> {
    sqlx::query_as::<_, Bank>("INSERT INTO banks (code, name) VALUES ($1, $2) RETURNING *")
        .bind(code)
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn update_bank(
    pool: &PgPool,
    id: i64,
    code: &str,
    name: &str,
) -> Result<Bank, sqlx::Error> {
    sqlx::query_as::<_, Bank>(
        "UPDATE banks SET code = $2, name = $3, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(code)
    .bind(name)
    .fetch_one(pool)
    .await
}

pub async fn create_account_number(
    pool: &PgPool,
    number: &str,
    holder: &str,
    bank_code: &str,
) -> Result<AccountNumber, sqlx::Error> {
    sqlx::query_as::<_, AccountNumber>(
        "INSERT INTO account_numbers (number, holder, bank_code) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(number)
    .bind(holder)
    .bind(bank_code)
    .fetch_one(pool)
    .await
}

pub async fn update_account_number(
    pool: &PgPool,
    id: i64,
    number: &str,
    holder: &str,
    bank_code: &str,
) -> Result<AccountNumber, sqlx::Error> {
    sqlx::query_as::<_, AccountNumber>(
        "UPDATE account_numbers SET number = $2, holder = $3, bank_code = $4, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(number)
    .bind(holder)
    .bind(bank_code)
    .fetch_one(pool)
    .await
}

pub async fn create_branch(
    pool: &PgPool,
    code: &str,
    name: &str,
    price_type: &str,
    depreciation_months: i32,
) -> Result<Branch, sqlx::Error> {
    sqlx::query_as::<_, Branch>(
        "INSERT INTO branches (code, name, price_type, depreciation_months)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(code)
    .bind(name)
    .bind(price_type)
    .bind(depreciation_months)
    .fetch_one(pool)
    .await
}

pub async fn update_branch(
    pool: &PgPool,
    id: i64,
    code: &str,
    name: &str,
    price_type: &str,
    depreciation_months: i32,
) -> Result<Branch, sqlx::Error> {
    sqlx::query_as::<_, Branch>(
        "UPDATE branches SET code = $2, name = $3, price_type = $4, depreciation_months = $5,
         updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(code)
    .bind(name)
    .bind(price_type)
    .bind(depreciation_months)
    .fetch_one(pool)
    .await
}

pub async fn create_color(pool: &PgPool, code: &str, name: &str) -> Result<Color, sqlx::Error> {
    sqlx::query_as::<_, Color>("INSERT INTO colors (code, name) VALUES ($1, $2) RETURNING *")
        .bind(code)
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn update_color(
    pool: &PgPool,
    id: i64,
    code: &str,
    name: &str,
) -> Result<Color, sqlx::Error> {
    sqlx::query_as::<_, Color>(
        "UPDATE colors SET code = $2, name = $3, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(code)
    .bind(name)
    .fetch_one(pool)
    .await
}

pub async fn create_phone(
    pool: &PgPool,
    number: &str,
    owner: &str,
    module: &str,
) -> Result<Phone, sqlx::Error> {
    sqlx::query_as::<_, Phone>(
        "INSERT INTO phones (number, owner, module) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(number)
    .bind(owner)
    .bind(module)
    .fetch_one(pool)
    .await
}

pub async fn update_phone(
    pool: &PgPool,
    id: i64,
    number: &str,
    owner: &str,
    module: &str,
) -> Result<Phone, sqlx::Error> {
    sqlx::query_as::<_, Phone>(
        "UPDATE phones SET number = $2, owner = $3, module = $4, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(number)
    .bind(owner)
    .bind(module)
    .fetch_one(pool)
    .await
}

pub async fn create_reimbursement_type(
    pool: &PgPool,
    code: &str,
    name: &str,
) -> Result<ReimbursementType, sqlx::Error> {
    sqlx::query_as::<_, ReimbursementType>(
        "INSERT INTO reimbursement_types (code, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(code)
    .bind(name)
    .fetch_one(pool)
    .await
}

pub async fn update_reimbursement_type(
    pool: &PgPool,
    id: i64,
    code: &str,
    name: &str,
) -> Result<ReimbursementType, sqlx::Error> {
    sqlx::query_as::<_, ReimbursementType>(
        "UPDATE reimbursement_types SET code = $2, name = $3, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(code)
    .bind(name)
    .fetch_one(pool)
    .await
}

/// Composite uniqueness lookup for the (role, module) pair.
pub async fn find_permission_pair(
    pool: &PgPool,
    role: &str,
    module: &str,
    exclude_id: Option<i64>,
) -> Result<Option<i64>, sqlx::Error> {
    let sql = match exclude_id {
        Some(_) => "SELECT id FROM user_permissions WHERE role = $1 AND module = $2 AND id <> $3",
        None => "SELECT id FROM user_permissions WHERE role = $1 AND module = $2",
    };

    let mut query = sqlx::query_scalar::<_, i64>(sql).bind(role).bind(module);
    if let Some(id) = exclude_id {
        query = query.bind(id);
    }
    query.fetch_optional(pool).await
}

pub struct PermissionFlags {
    pub can_create: bool,
    pub can_read: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

pub async fn create_user_permission(
    pool: &PgPool,
    role: &str,
    module: &str,
    flags: &PermissionFlags,
) -> Result<UserPermission, sqlx::Error> {
    sqlx::query_as::<_, UserPermission>(
        "INSERT INTO user_permissions (role, module, can_create, can_read, can_update, can_delete)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(role)
    .bind(module)
    .bind(flags.can_create)
    .bind(flags.can_read)
    .bind(flags.can_update)
    .bind(flags.can_delete)
    .fetch_one(pool)
    .await
}

pub async fn update_user_permission(
    pool: &PgPool,
    id: i64,
    role: &str,
    module: &str,
    flags: &PermissionFlags,
) -> Result<UserPermission, sqlx::Error> {
    sqlx::query_as::<_, UserPermission>(
        "UPDATE user_permissions SET role = $2, module = $3, can_create = $4, can_read = $5,
         can_update = $6, can_delete = $7, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(role)
    .bind(module)
    .bind(flags.can_create)
    .bind(flags.can_read)
    .bind(flags.can_update)
    .bind(flags.can_delete)
    .fetch_one(pool)
    .await
}

pub async fn create_cheque_fail_status(
    pool: &PgPool,
    code: &str,
    name: &str,
    description: Option<&str>,
) -> Result<ChequeFailStatus, sqlx::Error> {
    sqlx::query_as::<_, ChequeFailStatus>(
        "INSERT INTO cheque_fail_statuses (code, name, description)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(code)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn update_cheque_fail_status(
    pool: &PgPool,
    id: i64,
    code: &str,
    name: &str,
    description: Option<&str>,
) -> Result<ChequeFailStatus, sqlx::Error> {
    sqlx::query_as::<_, ChequeFailStatus>(
        "UPDATE cheque_fail_statuses SET code = $2, name = $3, description = $4, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(code)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}
