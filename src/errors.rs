//! Unified error types and result handling.
//!
//! Remote absence (`UserNotFound`, `ItemNotFound`, `FolderNotFound`) and local absence
//! (`FolderNotInLocalStore`, `NotInDatabase`) are kept apart on purpose: "does not exist
//! remotely" and "not yet mirrored locally" call for different reactions from the caller.

use thiserror::Error;

/// All failures surfaced by the streeplijst core.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The relational store rejected an operation
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable is missing
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// The remote returned no member for this student number
    #[error("User {student_number} is not found")]
    UserNotFound {
        /// Student number that was looked up
        student_number: String,
    },

    /// The remote returned no product for this id
    #[error("Item {item_id} is not found")]
    ItemNotFound {
        /// Remote product id
        item_id: i64,
    },

    /// The remote returned no products for this folder id
    #[error("Folder {folder_id} is not found")]
    FolderNotFound {
        /// Remote folder id
        folder_id: i64,
    },

    /// The folder was never registered in the local mirror
    #[error("Folder {folder_id} is not in the local store, register it with add_or_update_folder")]
    FolderNotInLocalStore {
        /// Folder id that was requested
        folder_id: i64,
    },

    /// A row that must exist locally is missing
    #[error("{entity} {id} is not in the database")]
    NotInDatabase {
        /// Entity kind (`"user"`, `"folder"`, `"item"`, `"sale"`)
        entity: &'static str,
        /// Identity that was looked up
        id: String,
    },

    /// The remote did not answer within the caller's budget
    #[error("Timeout: {message}")]
    Timeout {
        /// Transport error text
        message: String,
    },

    /// The remote refused the sale because the user has no signed direct-debit mandate
    #[error("403 Client Error: User has no signed SDD mandate ({message})")]
    UserNotSigned {
        /// Remote response body
        message: String,
    },

    /// Any other non-success response or transport failure
    #[error("Remote error{}: {message}", .status.map(|s| format!(" {s}")).unwrap_or_default())]
    Remote {
        /// HTTP status code, absent for transport failures
        status: Option<u16>,
        /// Error text or response body
        message: String,
    },

    /// Anything that does not fit the remote taxonomy, such as a malformed response
    #[error("Unexpected error: {message}")]
    Unexpected {
        /// What went wrong
        message: String,
    },

    /// Sale quantities must be positive and the total must fit in an `i64`
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// Requested quantity
        quantity: i64,
    },

    /// Unpublished items cannot be ordered
    #[error("Item {item_id} is not published")]
    ItemNotPublished {
        /// Item id
        item_id: i64,
    },

    /// A sale is posted at most once
    #[error("Sale {sale_id} was already posted (status {status})")]
    AlreadyPosted {
        /// Local sale id
        sale_id: i64,
        /// Terminal status the sale already carries
        status: String,
    },
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Unexpected {
            message: format!("Malformed response: {value}"),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout {
                message: value.to_string(),
            }
        } else if value.is_decode() {
            Self::Unexpected {
                message: value.to_string(),
            }
        } else {
            Self::Remote {
                status: value.status().map(|s| s.as_u16()),
                message: value.to_string(),
            }
        }
    }
}

impl Error {
    /// Shorthand for a missing local row.
    pub fn not_in_database(entity: &'static str, id: impl ToString) -> Self {
        Self::NotInDatabase {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
