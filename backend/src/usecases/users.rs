use std::sync::Arc;

use crates::domain::{
    errors::RepositoryError,
    repositories::users::UserRepository,
    value_objects::{
        profiles::ProfileUser,
        users::{NewUser, PublicUser, User, UserChanges},
    },
};
use tracing::{error, info};

use super::errors::{UseCaseError, UseCaseResult};

/// Account bootstrap and profile edits.
pub struct UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
}

impl<U> UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// First sign-in creates an empty account for the subject.
    pub async fn get_or_create_by_subject(
        &self,
        subject: &str,
        email: Option<String>,
    ) -> UseCaseResult<User> {
        if subject.trim().is_empty() {
            return Err(UseCaseError::Validation(
                "auth subject is required".to_string(),
            ));
        }

        if let Some(user) = self.find_by_subject(subject).await? {
            return Ok(user);
        }

        let user = self
            .user_repo
            .create(NewUser {
                auth_zero_sub_id: subject.to_string(),
                email: email.unwrap_or_default(),
            })
            .await
            .map_err(|err| {
                error!(db_error = ?err, "users: failed to create account");
                UseCaseError::Internal(err)
            })?;
        info!(user_id = user.id, "users: account created");
        Ok(user)
    }

    /// Private fields only for the account holder.
    pub async fn get_user(&self, user_id: i64, viewer_id: Option<i64>) -> UseCaseResult<ProfileUser> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "users: failed to load user");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| UseCaseError::NotFound(format!("user {user_id}")))?;

        if viewer_id == Some(user_id) {
            Ok(ProfileUser::Private(user))
        } else {
            Ok(ProfileUser::Public(PublicUser::from(&user)))
        }
    }

    pub async fn update_by_subject(
        &self,
        subject: &str,
        changes: UserChanges,
    ) -> UseCaseResult<User> {
        let user = self
            .find_by_subject(subject)
            .await?
            .ok_or_else(|| UseCaseError::NotFound("account for this subject".to_string()))?;
        self.apply_changes(user, changes).await
    }

    /// Only the account holder may edit their profile.
    pub async fn update_user(
        &self,
        caller_id: i64,
        user_id: i64,
        changes: UserChanges,
    ) -> UseCaseResult<User> {
        if caller_id != user_id {
            return Err(UseCaseError::NotFound(format!("user {user_id}")));
        }
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "users: failed to load user");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| UseCaseError::NotFound(format!("user {user_id}")))?;
        self.apply_changes(user, changes).await
    }

    async fn find_by_subject(&self, subject: &str) -> UseCaseResult<Option<User>> {
        self.user_repo
            .find_by_auth_sub(subject)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "users: subject lookup failed");
                UseCaseError::Internal(err)
            })
    }

    async fn apply_changes(&self, user: User, changes: UserChanges) -> UseCaseResult<User> {
        if changes.is_empty() {
            return Ok(user);
        }
        if changes.email.as_deref().is_some_and(|email| !email.contains('@')) {
            return Err(UseCaseError::Validation("email is not valid".to_string()));
        }

        let user_id = user.id;
        let updated = self
            .user_repo
            .update(user_id, changes)
            .await
            .map_err(|err| {
                if RepositoryError::is_not_found(&err) {
                    UseCaseError::NotFound(format!("user {user_id}"))
                } else {
                    error!(user_id, db_error = ?err, "users: failed to update user");
                    UseCaseError::Internal(err)
                }
            })?;
        info!(user_id, "users: profile updated");
        Ok(updated)
    }
}
