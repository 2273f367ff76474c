use crate::error::RosterResult;
use sqlx::{Pool, Sqlite, SqliteConnection};

pub mod student;

pub trait DataType: Sized {
    type Id;
    type FormForAdding;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<Option<Self>>;
    async fn get_all(pool: &Pool<Sqlite>) -> RosterResult<Vec<Self>>;
    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Self::Id>;
    async fn replace_in_database(
        id: Self::Id,
        replacement: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<()>;
    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<()>;
}
