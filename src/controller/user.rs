//! Member login.

use crate::{
    api::CommerceApi,
    core::user::{self, NewUser},
    entities::user::Model as User,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::time::Duration;
use tracing::{info, instrument};

/// Mirrors members from the remote on login.
#[derive(Debug)]
pub struct UserController<A> {
    db: DatabaseConnection,
    api: A,
}

impl<A: CommerceApi> UserController<A> {
    /// Creates a controller over the local store and the remote API.
    pub const fn new(db: DatabaseConnection, api: A) -> Self {
        Self { db, api }
    }

    /// Fetches the member and stores it, creating it on first login and refreshing it
    /// afterwards.
    ///
    /// # Errors
    /// `UserNotFound` when the remote does not know the student number.
    #[instrument(skip(self))]
    pub async fn login(&self, student_number: &str, timeout: Option<Duration>) -> Result<User> {
        let record = self.api.fetch_user(student_number, timeout).await?;
        let user = user::create_user(&self.db, NewUser::from(record)).await?;
        info!(user_id = user.id, "User logged in");
        Ok(user)
    }

    /// Local lookup only; never contacts the remote.
    pub async fn find_local(&self, student_number: &str) -> Result<Option<User>> {
        user::get_user_by_student_number(&self.db, student_number).await
    }
}
