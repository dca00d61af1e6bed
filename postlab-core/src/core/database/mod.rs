use anyhow::{bail, Context, Result};
use diesel::prelude::*;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

pub mod model;
#[rustfmt::skip]
pub mod schema;

use self::model::{PostRow, UserVersion};
use self::schema::posts;
use crate::core::post::Post;

/// Version stored in `PRAGMA user_version` once the table exists.
pub const SCHEMA_VERSION: i32 = 1;

/// Single-table post store. Every operation opens its own connection and
/// drops it before returning.
#[derive(Debug, Clone)]
pub struct PostStore {
    db_path: PathBuf,
    schema_version: i32,
}

impl PostStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::with_schema_version(db_path, SCHEMA_VERSION)
    }

    pub fn with_schema_version(db_path: impl Into<PathBuf>, schema_version: i32) -> Self {
        PostStore {
            db_path: db_path.into(),
            schema_version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn schema_version(&self) -> i32 {
        self.schema_version
    }

    // insert or replace the row keyed by post id
    pub fn upsert(&self, post: &Post) -> Result<()> {
        let mut connection = self.open()?;
        let row = PostRow::from(post);

        diesel::replace_into(posts::table)
            .values(&row)
            .execute(&mut connection)
            .with_context(|| format!("Failed to save post #{}", post.id()))?;

        debug!("Saved post #{} to {:?}", post.id(), self.db_path);
        Ok(())
    }

    // every row, in whatever order sqlite scans them
    pub fn read_all(&self) -> Result<Vec<Post>> {
        let mut connection = self.open()?;
        let rows = posts::table
            .select(PostRow::as_select())
            .load::<PostRow>(&mut connection)
            .context("Failed to read posts")?;

        debug!("Read {} posts from {:?}", rows.len(), self.db_path);
        Ok(rows.into_iter().map(Post::from).collect())
    }

    pub fn count(&self) -> Result<i64> {
        let mut connection = self.open()?;
        let count: i64 = posts::table
            .count()
            .get_result(&mut connection)
            .context("Failed to count posts")?;
        Ok(count)
    }

    fn open(&self) -> Result<SqliteConnection> {
        let database_url = self.db_path.to_string_lossy();
        let mut connection = SqliteConnection::establish(&database_url)
            .with_context(|| format!("Failed to open database at {:?}", self.db_path))?;

        self.ensure_schema(&mut connection)?;
        Ok(connection)
    }

    fn ensure_schema(&self, connection: &mut SqliteConnection) -> Result<()> {
        let target = self.schema_version;
        if user_version(connection)? == target {
            return Ok(());
        }

        connection.immediate_transaction(|conn| -> Result<()> {
            // re-read under the write lock, another opener may have won
            let current = user_version(conn)?;
            if current == target {
                return Ok(());
            }
            if current > target {
                bail!("Cannot downgrade database from version {} to {}", current, target);
            }

            if current == 0 {
                info!("Creating posts table in {:?}", self.db_path);
            } else {
                warn!(
                    "Upgrading database from version {} to {}, existing posts are dropped",
                    current, target
                );
                diesel::sql_query("DROP TABLE IF EXISTS posts").execute(conn)?;
            }
            create_posts_table(conn)?;

            diesel::sql_query(format!("PRAGMA user_version = {}", target)).execute(conn)?;
            Ok(())
        })
    }
}

fn user_version(connection: &mut SqliteConnection) -> Result<i32> {
    let version = diesel::sql_query("PRAGMA user_version")
        .get_result::<UserVersion>(connection)
        .context("Failed to read schema version")?;
    Ok(version.user_version)
}

fn create_posts_table(connection: &mut SqliteConnection) -> QueryResult<usize> {
    diesel::sql_query(
        "CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            title TEXT,
            body TEXT
        )",
    )
    .execute(connection)
}
