use crate::{
    data::DataType,
    error::{MakeQuerySnafu, MissingStudentSnafu, RosterError, RosterResult},
};
use futures::TryStreamExt;
use snafu::{ResultExt, ensure};
use sqlx::{Pool, Sqlite, SqliteConnection};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub email: Option<String>,
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} - age: {}, email: {}",
            self.first_name,
            self.last_name,
            self.age,
            self.email.as_deref().unwrap_or("None")
        )
    }
}

/// Every mutable column of a student, used both to insert and to fully replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub email: Option<String>,
}

/// A partial update. `None` leaves the column alone; for `email`, `Some(None)` clears it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i64>,
    pub email: Option<Option<String>>,
}

impl StudentPatch {
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.age.is_none()
            && self.email.is_none()
    }
}

impl Student {
    pub fn patched(self, patch: StudentPatch) -> NewStudent {
        let StudentPatch {
            first_name,
            last_name,
            age,
            email,
        } = patch;

        NewStudent {
            first_name: first_name.unwrap_or(self.first_name),
            last_name: last_name.unwrap_or(self.last_name),
            age: age.unwrap_or(self.age),
            email: email.unwrap_or(self.email),
        }
    }
}

impl DataType for Student {
    type Id = i64;
    type FormForAdding = NewStudent;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, first_name, last_name, age, email FROM students WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn get_all(pool: &Pool<Sqlite>) -> RosterResult<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, first_name, last_name, age, email FROM students ORDER BY id",
        )
        .fetch(pool)
        .map_err(|source| RosterError::MakeQuery { source })
        .try_collect()
        .await
    }

    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Self::Id> {
        let NewStudent {
            first_name,
            last_name,
            age,
            email,
        } = to_be_added;

        let result = sqlx::query(
            "INSERT INTO students (first_name, last_name, age, email) VALUES (?, ?, ?, ?)",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(age)
        .bind(email.as_deref())
        .execute(conn)
        .await
        .map_err(|source| RosterError::from_write(source, email.as_deref()))?;

        Ok(result.last_insert_rowid())
    }

    async fn replace_in_database(
        id: Self::Id,
        replacement: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<()> {
        let NewStudent {
            first_name,
            last_name,
            age,
            email,
        } = replacement;

        let result = sqlx::query(
            "UPDATE students SET first_name = ?, last_name = ?, age = ?, email = ? WHERE id = ?",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(age)
        .bind(email.as_deref())
        .bind(id)
        .execute(conn)
        .await
        .map_err(|source| RosterError::from_write(source, email.as_deref()))?;

        ensure!(result.rows_affected() > 0, MissingStudentSnafu { id });
        Ok(())
    }

    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<()> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?;

        ensure!(result.rows_affected() > 0, MissingStudentSnafu { id });
        Ok(())
    }
}
