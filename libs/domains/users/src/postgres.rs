use async_trait::async_trait;
use axum_helpers::Page;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, SqlErr, Statement,
    Value,
};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{NewUserRequest, User};
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
        }
    }
}

fn internal(err: DbErr) -> UserError {
    UserError::Internal(format!("Database error: {}", err))
}

/// `$first, $first+1, ...` placeholders for an `IN (...)` list
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|n| format!("${}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, input: NewUserRequest) -> UserResult<User> {
        let user = User::new(input);

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO users (id, email, name) VALUES ($1, $2, $3) RETURNING id, email, name",
            [user.id.into(), user.email.clone().into(), user.name.clone().into()],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    UserError::DuplicateEmail(user.email.clone())
                }
                _ => internal(e),
            })?
            .ok_or_else(|| UserError::Internal("Insert returned no row".to_string()))?;

        tracing::info!(user_id = %row.id, "Created user");
        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, email, name FROM users WHERE id = $1",
            [id.into()],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(internal)?;

        Ok(row.map(Into::into))
    }

    async fn get_by_ids(&self, ids: Vec<Uuid>) -> UserResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, email, name FROM users WHERE id IN ({}) ORDER BY id",
            placeholders(1, ids.len())
        );
        let values: Vec<Value> = ids.into_iter().map(Into::into).collect();
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let rows = UserRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(internal)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list(&self, ids: Vec<Uuid>, page: Page) -> UserResult<Vec<User>> {
        let offset = page.offset() as i64;
        let limit = page.limit() as i64;

        let stmt = if ids.is_empty() {
            Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT id, email, name FROM users ORDER BY id OFFSET $1 LIMIT $2",
                [offset.into(), limit.into()],
            )
        } else {
            let count = ids.len();
            let sql = format!(
                "SELECT id, email, name FROM users WHERE id IN ({}) ORDER BY id OFFSET ${} LIMIT ${}",
                placeholders(1, count),
                count + 1,
                count + 2
            );
            let mut values: Vec<Value> = ids.into_iter().map(Into::into).collect();
            values.push(offset.into());
            values.push(limit.into());
            Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
        };

        let rows = UserRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(internal)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let result = self
            .db
            .execute_raw(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "DELETE FROM users WHERE id = $1",
                [id.into()],
            ))
            .await
            .map_err(internal)?;

        let removed = result.rows_affected() > 0;
        if removed {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(removed)
    }
}
