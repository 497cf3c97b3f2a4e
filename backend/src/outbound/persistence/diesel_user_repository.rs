//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    DisplayName, EmailAddress, MentorProfile, PasswordHash, Role, User, UserId,
};

use super::error_mapping::{self, is_unique_violation};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    error_mapping::map_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    error_mapping::map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let role: Role = row
        .role
        .parse()
        .map_err(|_| UserRepositoryError::query(format!("unknown role: {}", row.role)))?;
    let mentor_profile = match role {
        Role::Mentor => Some(MentorProfile {
            expertise: row.mentor_expertise.unwrap_or_default(),
            hourly_rate_cents: row.mentor_hourly_rate_cents.unwrap_or_default(),
            bio: row.mentor_bio,
        }),
        Role::User => None,
    };
    Ok(User::new(
        UserId::from_uuid(row.id),
        DisplayName::new(row.display_name)
            .map_err(|err| UserRepositoryError::query(err.to_string()))?,
        EmailAddress::new(row.email).map_err(|err| UserRepositoryError::query(err.to_string()))?,
        role,
        PasswordHash::from_stored(row.password_hash),
        mentor_profile,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let profile = user.mentor_profile();
        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            display_name: user.display_name().as_ref(),
            email: user.email().as_ref(),
            role: user.role().as_str(),
            password_hash: user.password_hash().as_ref(),
            mentor_expertise: profile.map(|p| p.expertise.as_str()),
            mentor_hourly_rate_cents: profile.map(|p| p.hourly_rate_cents),
            mentor_bio: profile.and_then(|p| p.bio.as_deref()),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserRepositoryError::duplicate_email(user.email().as_ref())
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(user_id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn list_mentors(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(Role::Mentor.as_str()))
            .order(users::display_name.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }
}
