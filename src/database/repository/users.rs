use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Role, User};

const USER_COLUMNS: &str = "id, name, email, address, password_hash, role, created_at, updated_at";

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial update; `None` leaves the column untouched
#[derive(Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// Substring filters for the admin user listing
#[derive(Debug, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (name, email, address, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.address)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Like `find_by_id` but a missing row is a `NotFound` error
    pub async fn find_by_id_404(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, DatabaseError> {
        let mut qb = Self::list_query(filter);
        let users = qb.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    fn list_query(filter: &UserFilter) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE 1=1"
        ));
        if let Some(name) = &filter.name {
            qb.push(" AND name ILIKE ");
            qb.push_bind(format!("%{}%", name));
        }
        if let Some(email) = &filter.email {
            qb.push(" AND email ILIKE ");
            qb.push_bind(format!("%{}%", email));
        }
        if let Some(address) = &filter.address {
            qb.push(" AND address ILIKE ");
            qb.push_bind(format!("%{}%", address));
        }
        if let Some(role) = filter.role {
            qb.push(" AND role = ");
            qb.push_bind(role);
        }
        qb.push(" ORDER BY name");
        qb
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, DatabaseError> {
        let sql = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                address = COALESCE($4, address), \
                role = COALESCE($5, role), \
                updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.email)
            .bind(changes.address)
            .bind(changes.role)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_without_filters_is_unconditioned() {
        let qb = UserRepository::list_query(&UserFilter::default());
        let sql = qb.sql();
        assert!(sql.contains("WHERE 1=1 ORDER BY name"));
    }

    #[test]
    fn list_query_binds_substring_filters() {
        let filter = UserFilter {
            name: Some("smith".to_string()),
            email: None,
            address: Some("market".to_string()),
            role: Some(Role::StoreOwner),
        };
        let qb = UserRepository::list_query(&filter);
        let sql = qb.sql();
        assert!(sql.contains("name ILIKE $1"));
        assert!(sql.contains("address ILIKE $2"));
        assert!(sql.contains("role = $3"));
        assert!(!sql.contains("email ILIKE"));
    }
}
