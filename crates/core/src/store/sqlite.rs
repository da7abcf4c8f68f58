//! SQLite-backed course store implementation.

use std::time::Duration;

use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, ErrorCode};
use tracing::debug;

use super::{CourseStore, StoreError, StoreStats, SEARCH_LIMIT};
use crate::config::DatabaseConfig;
use crate::course::{Course, StoredCourse};

type SqliteConn = PooledConnection<SqliteConnectionManager>;

/// Idle connections above `max_idle` are closed after this long.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// SQLite-backed course store over a shared connection pool.
pub struct SqliteCourseStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteCourseStore {
    /// Open (or create) the database file and tables, sized by `config`.
    pub fn new(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(&config.path).with_init(init_connection);

        // Zero lifetime means connections are never recycled.
        let max_lifetime = match config.max_lifetime_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        // r2d2 has no idle ceiling: `max_idle` is the idle floor opened at
        // startup, and idle connections above it are reaped after the idle
        // timeout. Liveness is checked once per checkout in `conn()`.
        let pool = Pool::builder()
            .max_size(config.max_open)
            .min_idle(Some(config.max_idle.min(config.max_open)))
            .idle_timeout(Some(IDLE_TIMEOUT))
            .max_lifetime(max_lifetime)
            .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
            .test_on_check_out(false)
            .build(manager)
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        debug!(
            path = %config.path.display(),
            max_open = config.max_open,
            max_idle = config.max_idle,
            "Opened course store pool"
        );

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    ///
    /// Every in-memory connection is its own database, so the pool holds one.
    pub fn in_memory() -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::memory().with_init(init_connection);
        let pool = Pool::builder()
            .max_size(1)
            .test_on_check_out(false)
            .build(manager)
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            -- One row per (search term, course name)
            CREATE TABLE IF NOT EXISTS course (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                search TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(search, name)
            );

            CREATE INDEX IF NOT EXISTS idx_course_search ON course(search);
            CREATE INDEX IF NOT EXISTS idx_course_name ON course(name);

            -- Authors of each course
            CREATE TABLE IF NOT EXISTS author (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id INTEGER NOT NULL REFERENCES course(id) ON DELETE CASCADE,
                author TEXT NOT NULL,
                name TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_author_course_id ON author(course_id);
            CREATE INDEX IF NOT EXISTS idx_author_name ON author(name);
            "#,
        )
        .map_err(classify)?;

        Ok(())
    }

    /// Check out a connection and verify it is alive before use.
    fn conn(&self) -> Result<SqliteConn, StoreError> {
        let conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(conn)
    }

    fn load_authors(
        conn: &Connection,
        sql: &str,
        key: &dyn rusqlite::ToSql,
    ) -> Result<Vec<String>, StoreError> {
        let mut stmt = conn.prepare(sql).map_err(classify)?;

        let rows = stmt
            .query_map(&[key], |row| row.get::<_, String>(0))
            .map_err(classify)?;

        let mut authors = Vec::new();
        for row in rows {
            authors.push(row.map_err(classify)?);
        }
        Ok(authors)
    }
}

fn init_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    // journal_mode answers with the resulting mode, so it has to be read.
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

/// Map a rusqlite error, separating lock contention from hard failures.
fn classify(e: rusqlite::Error) -> StoreError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            StoreError::Busy(e.to_string())
        }
        _ => StoreError::Database(e.to_string()),
    }
}

impl CourseStore for SqliteCourseStore {
    fn insert_course(&self, course: &Course) -> Result<Option<i64>, StoreError> {
        let conn = self.conn()?;

        let inserted = conn
            .execute(
                "INSERT INTO course (name, description, search, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(search, name) DO NOTHING",
                params![
                    &course.name,
                    &course.description,
                    &course.search_term,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(classify)?;

        if inserted == 0 {
            return Ok(None);
        }

        Ok(Some(conn.last_insert_rowid()))
    }

    fn insert_author(
        &self,
        course_id: i64,
        author_name: &str,
        course_name: &str,
    ) -> Result<i64, StoreError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO author (course_id, author, name) VALUES (?1, ?2, ?3)",
            params![course_id, author_name, course_name],
        )
        .map_err(classify)?;

        Ok(conn.last_insert_rowid())
    }

    fn search_courses(&self, term: &str) -> Result<Vec<StoredCourse>, StoreError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, search, name, description
                 FROM course
                 WHERE search = ?1
                 ORDER BY id
                 LIMIT ?2",
            )
            .map_err(classify)?;

        let rows = stmt
            .query_map(params![term, SEARCH_LIMIT as i64], |row| {
                Ok(StoredCourse {
                    id: row.get(0)?,
                    course: Course {
                        search_term: row.get(1)?,
                        name: row.get(2)?,
                        description: row.get(3)?,
                        author_ids: Vec::new(), // Loaded by the query flow
                    },
                })
            })
            .map_err(classify)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(classify)?);
        }

        Ok(results)
    }

    fn find_authors_by_course_name(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn()?;
        Self::load_authors(
            &conn,
            "SELECT author FROM author WHERE name = ?1 ORDER BY id",
            &name,
        )
    }

    fn find_authors_by_course_id(&self, course_id: i64) -> Result<Vec<String>, StoreError> {
        let conn = self.conn()?;
        Self::load_authors(
            &conn,
            "SELECT author FROM author WHERE course_id = ?1 ORDER BY id",
            &course_id,
        )
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let conn = self.conn()?;

        let courses: i64 = conn
            .query_row("SELECT COUNT(*) FROM course", [], |row| row.get(0))
            .map_err(classify)?;

        let authors: i64 = conn
            .query_row("SELECT COUNT(*) FROM author", [], |row| row.get(0))
            .map_err(classify)?;

        Ok(StoreStats {
            courses: courses as u64,
            authors: authors as u64,
        })
    }

    fn ping(&self) -> Result<(), StoreError> {
        self.conn().map(|_| ())
    }
}
