pub mod from_row;
pub mod queries;
pub mod schema;

use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
}

impl AppState {
    /// Open (or create) the database at `path`, run the schema, and wrap the
    /// pool. Foreign keys are enabled on every pooled connection.
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = r2d2::Pool::new(manager)?;

        let conn = pool.get()?;
        schema::init_db(&conn)?;
        drop(conn);

        Ok(Self { db: pool })
    }
}
