//! Login use-case backed by the user repository.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{LoginService, UserRepository, UserRepositoryError};
use crate::domain::{Error, LoginCredentials, UserId};

/// Authenticates credentials against persisted accounts.
#[derive(Clone)]
pub struct DieselLoginService {
    users: Arc<dyn UserRepository>,
}

impl DieselLoginService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { .. } => Error::service_unavailable(error.to_string()),
        UserRepositoryError::Query { .. } | UserRepositoryError::DuplicateEmail { .. } => {
            Error::internal(error.to_string())
        }
    }
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?;

        // Unknown address and wrong password are indistinguishable to callers.
        let Some(user) = user else {
            debug!(email = %credentials.email(), "login for unknown email");
            return Err(Error::unauthorized("invalid credentials"));
        };

        if user.password_hash().verify(credentials.password()) {
            Ok(user.id().clone())
        } else {
            debug!(user_id = %user.id(), "login with wrong password");
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::MockUserRepository;
    use crate::domain::{DisplayName, EmailAddress, ErrorCode, PasswordHash, Role, User};

    fn stored_user(password: &str) -> User {
        User::new(
            UserId::random(),
            DisplayName::new("Ada Lovelace").expect("valid name"),
            EmailAddress::new("ada@example.com").expect("valid email"),
            Role::User,
            PasswordHash::derive(password).expect("valid password"),
            None,
        )
    }

    fn credentials(password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts("ada@example.com", password).expect("credentials shape")
    }

    #[rstest]
    #[tokio::test]
    async fn matching_password_authenticates() {
        let user = stored_user("correct horse");
        let expected_id = user.id().clone();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .return_once(move |_| Ok(Some(user)));

        let service = DieselLoginService::new(Arc::new(repo));
        let id = service
            .authenticate(&credentials("correct horse"))
            .await
            .expect("authentication succeeds");
        assert_eq!(id, expected_id);
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let user = stored_user("correct horse");
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .return_once(move |_| Ok(Some(user)));

        let service = DieselLoginService::new(Arc::new(repo));
        let err = service
            .authenticate(&credentials("wrong password"))
            .await
            .expect_err("authentication fails");
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_email_is_unauthorized() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().return_once(|_| Ok(None));

        let service = DieselLoginService::new(Arc::new(repo));
        let err = service
            .authenticate(&credentials("anything else"))
            .await
            .expect_err("authentication fails");
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn repository_outage_is_service_unavailable() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .return_once(|_| Err(UserRepositoryError::connection("pool exhausted")));

        let service = DieselLoginService::new(Arc::new(repo));
        let err = service
            .authenticate(&credentials("correct horse"))
            .await
            .expect_err("authentication fails");
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
    }
}
