use axum::{
    Json,
    extract::rejection::{FormRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error commiting SQL transaction"))]
    CommitTransaction { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to parse maximum DB connections"))]
    ParseMaxConnections { source: ParseIntError },
    #[snafu(display("Missing argument: `{}`", field))]
    MissingField { field: &'static str },
    #[snafu(display("Unable to parse age {:?}", original))]
    InvalidAge {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("No student with ID: {}", id))]
    MissingStudent { id: i64 },
    #[snafu(display("No student with ID: {}", original))]
    UnknownStudentId { original: String },
    #[snafu(display("Unable to read form body: {}", source.body_text()))]
    ReadForm { source: FormRejection },
    #[snafu(display("Unable to read path: {}", source.body_text()))]
    ReadPath { source: PathRejection },
    #[snafu(display("No route for {}", path))]
    UnknownRoute { path: String },
    #[snafu(display("No students found!"))]
    NoStudents,
    #[snafu(display("A student with email {:?} already exists", email))]
    DuplicateEmail { email: String },
}

impl RosterError {
    /// Turns a failed write into [`RosterError::DuplicateEmail`] when the `email` unique
    /// constraint rejected it, and [`RosterError::MakeQuery`] otherwise.
    pub fn from_write(source: sqlx::Error, email: Option<&str>) -> Self {
        match &source {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                Self::DuplicateEmail {
                    email: email.unwrap_or_default().to_string(),
                }
            }
            _ => Self::MakeQuery { source },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input
        const CF: StatusCode = StatusCode::CONFLICT;

        match self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MigrateError { .. } => ISE,
            Self::MakeQuery { .. } | Self::CommitTransaction { .. } => ISE,
            Self::ParseMaxConnections { .. } => ISE,
            Self::MissingField { .. } | Self::InvalidAge { .. } => BI,
            Self::ReadForm { .. } | Self::ReadPath { .. } => BI,
            Self::MissingStudent { .. } | Self::UnknownStudentId { .. } => NF,
            Self::NoStudents | Self::UnknownRoute { .. } => NF,
            Self::DuplicateEmail { .. } => CF,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(?self, %status_code, "Rejected request");
        }

        (
            status_code,
            Json(ErrorBody {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
