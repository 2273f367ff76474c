use crate::{
    data::{
        DataType,
        student::{NewStudent, Student, StudentPatch},
    },
    error::{
        CommitTransactionSnafu, InvalidAgeSnafu, MissingFieldSnafu, MissingStudentSnafu,
        NoStudentsSnafu, ReadFormSnafu, ReadPathSnafu, RosterError, RosterResult,
        UnknownRouteSnafu,
    },
    state::RosterState,
};
use axum::{
    Form, Json,
    extract::{FromRequestParts, Path, State, rejection::FormRejection},
    http::{StatusCode, Uri, request::Parts},
};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, ensure};

#[derive(Serialize)]
pub struct StudentList {
    #[serde(rename = "Students")]
    students: Vec<StudentSummary>,
}

#[derive(Serialize)]
pub struct StudentSummary {
    first_name: String,
    last_name: String,
    age: i64,
    email: Option<String>,
}

impl From<Student> for StudentSummary {
    fn from(student: Student) -> Self {
        Self {
            first_name: student.first_name,
            last_name: student.last_name,
            age: student.age,
            email: student.email,
        }
    }
}

#[derive(Serialize)]
pub struct StudentDetail {
    #[serde(rename = "First name")]
    first_name: String,
    #[serde(rename = "Last name")]
    last_name: String,
    #[serde(rename = "Age")]
    age: i64,
    #[serde(rename = "Email")]
    email: Option<String>,
}

impl From<Student> for StudentDetail {
    fn from(student: Student) -> Self {
        Self {
            first_name: student.first_name,
            last_name: student.last_name,
            age: student.age,
            email: student.email,
        }
    }
}

#[derive(Serialize)]
pub struct CreatedStudent {
    #[serde(rename = "ID")]
    id: i64,
}

#[derive(Serialize)]
pub struct Message {
    message: String,
}

impl Message {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// The `{id}` path segment. Anything that isn't an integer can't name a student, so it is
/// reported as not found.
pub struct StudentId(i64);

impl<S: Send + Sync> FromRequestParts<S> for StudentId {
    type Rejection = RosterError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .context(ReadPathSnafu)?;

        match raw.parse() {
            Ok(id) => Ok(Self(id)),
            Err(_) => Err(RosterError::UnknownStudentId { original: raw }),
        }
    }
}

/// Form bodies are extracted as a `Result` and only unwrapped after the student lookup.
type MaybeForm<T> = Result<Form<T>, FormRejection>;

/// Form body for create and full replace. Everything is optional here so that an absent
/// field becomes a `MissingField` rather than a generic form rejection.
#[derive(Deserialize)]
pub struct StudentForm {
    first_name: Option<String>,
    last_name: Option<String>,
    age: Option<String>,
    email: Option<String>,
}

impl StudentForm {
    fn into_new_student(self) -> RosterResult<NewStudent> {
        let Self {
            first_name,
            last_name,
            age,
            email,
        } = self;

        let first_name = required(first_name, "first_name")?;
        let last_name = required(last_name, "last_name")?;
        let age = parse_age(required(age, "age")?)?;

        Ok(NewStudent {
            first_name,
            last_name,
            age,
            email: email.and_then(optional),
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> RosterResult<String> {
    value
        .filter(|value| !value.is_empty())
        .context(MissingFieldSnafu { field })
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn parse_age(age: String) -> RosterResult<i64> {
    age.trim()
        .parse()
        .context(InvalidAgeSnafu { original: age })
}

/// Applies submitted pairs in order, keeping only the patchable columns.
fn patch_from_fields(fields: Vec<(String, String)>) -> RosterResult<StudentPatch> {
    let mut patch = StudentPatch::default();

    for (key, value) in fields {
        match key.as_str() {
            "first_name" => patch.first_name = Some(required(Some(value), "first_name")?),
            "last_name" => patch.last_name = Some(required(Some(value), "last_name")?),
            "age" => patch.age = Some(parse_age(value)?),
            "email" => patch.email = Some(optional(value)),
            _ => debug!(?key, "Ignoring field that cannot be patched"),
        }
    }

    Ok(patch)
}

pub async fn unknown_route(uri: Uri) -> RosterError {
    UnknownRouteSnafu {
        path: uri.path().to_string(),
    }
    .build()
}

pub async fn list_students(State(state): State<RosterState>) -> RosterResult<Json<StudentList>> {
    let students = Student::get_all(&state).await?;
    ensure!(!students.is_empty(), NoStudentsSnafu);

    Ok(Json(StudentList {
        students: students.into_iter().map(StudentSummary::from).collect(),
    }))
}

#[axum::debug_handler]
pub async fn create_student(
    State(state): State<RosterState>,
    form: MaybeForm<StudentForm>,
) -> RosterResult<(StatusCode, Json<CreatedStudent>)> {
    let Form(form) = form.context(ReadFormSnafu)?;
    let new_student = form.into_new_student()?;
    let id =
        Student::insert_into_database(new_student, &mut *state.get_connection().await?).await?;

    info!(id, "Created student");
    Ok((StatusCode::CREATED, Json(CreatedStudent { id })))
}

pub async fn get_student(
    State(state): State<RosterState>,
    StudentId(id): StudentId,
) -> RosterResult<Json<StudentDetail>> {
    let student = Student::get_from_db_by_id(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id })?;

    Ok(Json(student.into()))
}

pub async fn replace_student(
    State(state): State<RosterState>,
    StudentId(id): StudentId,
    form: MaybeForm<StudentForm>,
) -> RosterResult<Json<Message>> {
    let mut transaction = state.get_transaction().await?;

    let Some(existing) = Student::get_from_db_by_id(id, &mut *transaction).await? else {
        return MissingStudentSnafu { id }.fail();
    };
    let Form(form) = form.context(ReadFormSnafu)?;
    let replacement = form.into_new_student()?;

    Student::replace_in_database(id, replacement, &mut *transaction).await?;
    transaction.commit().await.context(CommitTransactionSnafu)?;

    info!(id, previous = %existing, "Replaced student");
    Ok(Message::new(format!(
        "Student with ID {id} updated successfully"
    )))
}

pub async fn patch_student(
    State(state): State<RosterState>,
    StudentId(id): StudentId,
    fields: MaybeForm<Vec<(String, String)>>,
) -> RosterResult<Json<Message>> {
    let mut transaction = state.get_transaction().await?;

    let Some(existing) = Student::get_from_db_by_id(id, &mut *transaction).await? else {
        return MissingStudentSnafu { id }.fail();
    };
    let Form(fields) = fields.context(ReadFormSnafu)?;
    let patch = patch_from_fields(fields)?;

    if patch.is_empty() {
        debug!(id, "Nothing to patch");
        return Ok(Message::new("OK"));
    }

    Student::replace_in_database(id, existing.patched(patch), &mut *transaction).await?;
    transaction.commit().await.context(CommitTransactionSnafu)?;

    info!(id, "Patched student");
    Ok(Message::new("OK"))
}

pub async fn delete_student(
    State(state): State<RosterState>,
    StudentId(id): StudentId,
) -> RosterResult<StatusCode> {
    Student::remove_from_database(id, &mut *state.get_connection().await?).await?;

    info!(id, "Deleted student");
    Ok(StatusCode::NO_CONTENT)
}
