//! SQLite persistence for users, permissions and grants

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use iam_core::{
    persistence_error, Grant, GrantId, GrantStore, IamError, IamResult,
    NewPermission, NewUser, Permission, PermissionId, PermissionStore, User, UserId, UserStore,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Row, SqlitePool,
};
use tracing::{debug, info};

/// Tables are created idempotently on every start.
///
/// `AUTOINCREMENT` keeps ids monotonic across deletes, so a dangling grant can
/// never point at a newer row that reused an old id.
const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS permissions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL,
        deletable BOOLEAN NOT NULL DEFAULT TRUE,
        editable BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS user_permissions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        permission_id INTEGER NOT NULL,
        UNIQUE (user_id, permission_id)
    );

    CREATE INDEX IF NOT EXISTS idx_user_permissions_user ON user_permissions(user_id);
"#;

const GRANT_COLUMNS: &str = r#"
    SELECT up.id, up.user_id, up.permission_id, p.name AS permission_name
    FROM user_permissions up
    INNER JOIN permissions p ON p.id = up.permission_id
    INNER JOIN users u ON u.id = up.user_id
"#;

/// Store backed by a SQLite pool. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and make sure the schema exists
    pub async fn connect(database_url: &str) -> IamResult<Self> {
        info!(database_url, "Connecting to database");

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(persistence_error!("parse the database URL"))?
            .create_if_missing(true);

        // An in-memory database lives and dies with its single connection
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePoolOptions::new()
                .max_connections(8)
                .connect_with(options)
                .await
        }
        .map_err(persistence_error!("connect to the database"))?;

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create_tables(&self) -> IamResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(persistence_error!("create tables"))?;

        debug!("Schema ready");
        Ok(())
    }

    async fn grant_by_id(&self, id: GrantId) -> IamResult<Option<Grant>> {
        let query = format!("{GRANT_COLUMNS} WHERE up.id = ?");
        sqlx::query(&query)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error!("load grant"))?
            .map(|row| grant_from_row(&row))
            .transpose()
    }
}

/// Unique constraint violations become `Conflict`; everything else is a store failure
fn write_error(operation: &'static str, conflict: String) -> impl FnOnce(sqlx::Error) -> IamError {
    move |e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => IamError::conflict(conflict),
        other => IamError::persistence(format!("Failed to {}", operation), other),
    }
}

fn decode_error(entity: &'static str) -> impl FnOnce(sqlx::Error) -> IamError {
    move |e| IamError::persistence(format!("Failed to decode {}", entity), e)
}

fn user_from_row(row: &SqliteRow, with_secret: bool) -> IamResult<User> {
    let decode = || decode_error("user");
    let password_hash = if with_secret {
        Some(row.try_get("password").map_err(decode())?)
    } else {
        None
    };

    Ok(User {
        id: UserId(row.try_get("id").map_err(decode())?),
        username: row.try_get("username").map_err(decode())?,
        password_hash,
        created_at: row.try_get("created_at").map_err(decode())?,
    })
}

fn permission_from_row(row: &SqliteRow) -> IamResult<Permission> {
    let decode = || decode_error("permission");
    Ok(Permission {
        id: PermissionId(row.try_get("id").map_err(decode())?),
        name: row.try_get("name").map_err(decode())?,
        description: row.try_get("description").map_err(decode())?,
        deletable: row.try_get("deletable").map_err(decode())?,
        editable: row.try_get("editable").map_err(decode())?,
        created_at: row.try_get("created_at").map_err(decode())?,
        updated_at: row.try_get("updated_at").map_err(decode())?,
    })
}

fn grant_from_row(row: &SqliteRow) -> IamResult<Grant> {
    let decode = || decode_error("grant");
    Ok(Grant {
        id: GrantId(row.try_get("id").map_err(decode())?),
        user_id: UserId(row.try_get("user_id").map_err(decode())?),
        permission_id: PermissionId(row.try_get("permission_id").map_err(decode())?),
        permission_name: row.try_get("permission_name").map_err(decode())?,
    })
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn insert_user(&self, user: NewUser) -> IamResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, password, created_at) VALUES (?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(write_error(
            "insert user",
            format!("The username {} is already taken", user.username),
        ))?;

        let id = UserId(result.last_insert_rowid());
        self.user_by_id(id)
            .await?
            .ok_or(IamError::NotFound { resource: "user" })
    }

    async fn user_by_id(&self, id: UserId) -> IamResult<Option<User>> {
        sqlx::query("SELECT id, username, created_at FROM users WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error!("query user by id"))?
            .map(|row| user_from_row(&row, false))
            .transpose()
    }

    async fn user_by_username(
        &self,
        username: &str,
        with_secret: bool,
    ) -> IamResult<Option<User>> {
        let query = if with_secret {
            "SELECT id, username, password, created_at FROM users WHERE username = ?"
        } else {
            "SELECT id, username, created_at FROM users WHERE username = ?"
        };

        sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error!("query user by username"))?
            .map(|row| user_from_row(&row, with_secret))
            .transpose()
    }

    async fn list_users(&self) -> IamResult<Vec<User>> {
        sqlx::query("SELECT id, username, created_at FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(persistence_error!("list users"))?
            .iter()
            .map(|row| user_from_row(row, false))
            .collect()
    }

    async fn delete_user(&self, id: UserId) -> IamResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(persistence_error!("delete user"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PermissionStore for SqliteStore {
    async fn insert_permission(&self, permission: NewPermission) -> IamResult<Permission> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO permissions (name, description, deletable, editable, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&permission.name)
        .bind(&permission.description)
        .bind(permission.deletable)
        .bind(permission.editable)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(write_error(
            "insert permission",
            format!("A permission named {} already exists", permission.name),
        ))?;

        let id = PermissionId(result.last_insert_rowid());
        self.permission_by_id(id).await?.ok_or(IamError::NotFound {
            resource: "permission",
        })
    }

    async fn permission_by_id(&self, id: PermissionId) -> IamResult<Option<Permission>> {
        sqlx::query("SELECT * FROM permissions WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error!("query permission by id"))?
            .map(|row| permission_from_row(&row))
            .transpose()
    }

    async fn permission_by_name(&self, name: &str) -> IamResult<Option<Permission>> {
        sqlx::query("SELECT * FROM permissions WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error!("query permission by name"))?
            .map(|row| permission_from_row(&row))
            .transpose()
    }

    async fn list_permissions(&self) -> IamResult<Vec<Permission>> {
        sqlx::query("SELECT * FROM permissions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(persistence_error!("list permissions"))?
            .iter()
            .map(permission_from_row)
            .collect()
    }

    async fn update_permission(
        &self,
        id: PermissionId,
        name: &str,
        description: &str,
    ) -> IamResult<Permission> {
        let result = sqlx::query(
            r#"
            UPDATE permissions SET name = ?, description = ?, updated_at = ?
            WHERE id = ? AND editable = TRUE
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(write_error(
            "update permission",
            format!("A permission named {} already exists", name),
        ))?;

        if result.rows_affected() == 0 {
            return Err(IamError::NotEditable);
        }

        self.permission_by_id(id).await?.ok_or(IamError::NotFound {
            resource: "permission",
        })
    }

    async fn delete_permission(&self, id: PermissionId) -> IamResult<()> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = ? AND deletable = TRUE")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(persistence_error!("delete permission"))?;

        if result.rows_affected() == 0 {
            return Err(IamError::NotDeletable);
        }
        Ok(())
    }
}

#[async_trait]
impl GrantStore for SqliteStore {
    async fn insert_grant(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> IamResult<Grant> {
        let result =
            sqlx::query("INSERT INTO user_permissions (user_id, permission_id) VALUES (?, ?)")
                .bind(user_id.get())
                .bind(permission_id.get())
                .execute(&self.pool)
                .await
                .map_err(write_error(
                    "insert grant",
                    "The user already has this permission".to_string(),
                ))?;

        self.grant_by_id(GrantId(result.last_insert_rowid()))
            .await?
            .ok_or(IamError::NotFound {
                resource: "permission",
            })
    }

    async fn grant_for(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> IamResult<Option<Grant>> {
        let query = format!("{GRANT_COLUMNS} WHERE up.user_id = ? AND up.permission_id = ?");
        sqlx::query(&query)
            .bind(user_id.get())
            .bind(permission_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error!("query grant"))?
            .map(|row| grant_from_row(&row))
            .transpose()
    }

    async fn delete_grant(&self, id: GrantId) -> IamResult<bool> {
        let result = sqlx::query("DELETE FROM user_permissions WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(persistence_error!("delete grant"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn grants_for_user(&self, user_id: UserId) -> IamResult<Vec<Grant>> {
        let query = format!("{GRANT_COLUMNS} WHERE up.user_id = ? ORDER BY up.id");
        sqlx::query(&query)
            .bind(user_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(persistence_error!("list grants"))?
            .iter()
            .map(grant_from_row)
            .collect()
    }

    async fn holds_permission(&self, user_id: UserId, permission_name: &str) -> IamResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM user_permissions up
            INNER JOIN permissions p ON p.id = up.permission_id
            INNER JOIN users u ON u.id = up.user_id
            WHERE up.user_id = ? AND p.name = ?
            LIMIT 1
            "#,
        )
        .bind(user_id.get())
        .bind(permission_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence_error!("verify permission"))?;

        Ok(row.is_some())
    }
}
