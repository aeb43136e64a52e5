//! User store - Persists members mirrored from the remote commerce system.
//!
//! Users are keyed by their remote id. `create_user` is an upsert so a repeated
//! login refreshes the stored row instead of duplicating it.

use crate::{
    core::upsert::{create_or_update, delete_existing, set_some, update_existing},
    entities::{User, user},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Every mirrored field of a user, as received from the remote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    /// Remote member id
    pub id: i64,
    /// Student number (login key)
    pub student_number: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Family name prefix
    pub last_name_prefix: Option<String>,
    /// Date of birth
    pub date_of_birth: Date,
    /// Whether a direct-debit mandate is signed
    pub has_signed_mandate: bool,
    /// Profile picture URL
    pub profile_picture_url: Option<String>,
}

/// A partial update; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// New login name
    pub student_number: Option<String>,
    /// New first name
    pub first_name: Option<String>,
    /// New last name
    pub last_name: Option<String>,
    /// `Some(None)` clears the prefix
    pub last_name_prefix: Option<Option<String>>,
    /// New date of birth
    pub date_of_birth: Option<Date>,
    /// Whether a direct-debit mandate is on file
    pub has_signed_mandate: Option<bool>,
    /// `Some(None)` clears the picture
    pub profile_picture_url: Option<Option<String>>,
}

impl From<NewUser> for user::ActiveModel {
    fn from(new: NewUser) -> Self {
        Self {
            id: Set(new.id),
            student_number: Set(new.student_number),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            last_name_prefix: Set(new.last_name_prefix),
            date_of_birth: Set(new.date_of_birth),
            has_signed_mandate: Set(new.has_signed_mandate),
            profile_picture_url: Set(new.profile_picture_url),
            ..Default::default()
        }
    }
}

impl UserChanges {
    fn into_active_model(self, id: i64) -> user::ActiveModel {
        let mut model = user::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        set_some(&mut model.student_number, self.student_number);
        set_some(&mut model.first_name, self.first_name);
        set_some(&mut model.last_name, self.last_name);
        set_some(&mut model.last_name_prefix, self.last_name_prefix);
        set_some(&mut model.date_of_birth, self.date_of_birth);
        set_some(&mut model.has_signed_mandate, self.has_signed_mandate);
        set_some(&mut model.profile_picture_url, self.profile_picture_url);
        model
    }
}

/// Stores a user, or refreshes every field of the existing user with the same id.
///
/// # Errors
/// Returns `Database` if the write fails.
pub async fn create_user(db: &DatabaseConnection, new: NewUser) -> Result<user::Model> {
    let id = new.id;
    create_or_update(db, id, user::ActiveModel::from(new)).await
}

/// Updates only the fields present in `changes` and refreshes `updated_at`.
///
/// # Errors
/// Returns `NotInDatabase` if the user does not exist.
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    changes: UserChanges,
) -> Result<user::Model> {
    update_existing(db, "user", user_id, changes.into_active_model(user_id)).await
}

/// Deletes a user and returns the row as it was. Sales referencing the user are kept.
///
/// # Errors
/// Returns `NotInDatabase` if the user does not exist, or `Database` if the delete fails.
pub async fn delete_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    delete_existing::<User, _>(db, "user", user_id).await
}

/// Retrieves a user by remote id.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds the user that logs in with this student number.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_user_by_student_number(
    db: &DatabaseConnection,
    student_number: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::StudentNumber.eq(student_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every user, ordered by id.
///
/// # Errors
/// Returns `Database` if the query fails.
pub async fn get_all_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
