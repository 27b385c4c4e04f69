//! SQLite-backed run store.

use async_trait::async_trait;
use chrono::Utc;
use runbridge_spec::{RunRecord, RunSpec, RunStatus};
use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::{RunStore, StoreError};

/// SQLite-based [`RunStore`] implementation.
///
/// Run spec and status are stored as JSON columns; lookups accept either the
/// run id or the full run key.
pub struct SqliteStore {
  pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct RunRow {
  project: String,
  id: String,
  key: String,
  spec: Json<RunSpec>,
  status: Json<RunStatus>,
}

impl From<RunRow> for RunRecord {
  fn from(row: RunRow) -> Self {
    RunRecord {
      project: row.project,
      id: row.id,
      key: row.key,
      spec: row.spec.0,
      status: row.status.0,
    }
  }
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await
  }
}

#[async_trait]
impl RunStore for SqliteStore {
  async fn get_run(&self, project: &str, id_or_key: &str) -> Result<RunRecord, StoreError> {
    let row: Option<RunRow> = sqlx::query_as(
      r#"
            SELECT project, id, key, spec, status
            FROM runs
            WHERE project = ? AND (id = ? OR key = ?)
            "#,
    )
    .bind(project)
    .bind(id_or_key)
    .bind(id_or_key)
    .fetch_optional(&self.pool)
    .await?;

    row.map(RunRecord::from).ok_or_else(|| {
      StoreError::NotFound(format!("run '{id_or_key}' in project '{project}'"))
    })
  }

  async fn refresh(&self, run: &RunRecord) -> Result<RunRecord, StoreError> {
    self.get_run(&run.project, &run.id).await
  }

  async fn save(&self, run: &RunRecord, update: bool) -> Result<(), StoreError> {
    let now = Utc::now();

    if update {
      let result = sqlx::query(
        r#"
                UPDATE runs
                SET spec = ?, status = ?, updated_at = ?
                WHERE project = ? AND id = ?
                "#,
      )
      .bind(Json(&run.spec))
      .bind(Json(&run.status))
      .bind(now)
      .bind(&run.project)
      .bind(&run.id)
      .execute(&self.pool)
      .await?;

      if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(format!(
          "run '{}' in project '{}'",
          run.id, run.project
        )));
      }
    } else {
      sqlx::query(
        r#"
                INSERT INTO runs (project, id, key, spec, status, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
      )
      .bind(&run.project)
      .bind(&run.id)
      .bind(&run.key)
      .bind(Json(&run.spec))
      .bind(Json(&run.status))
      .bind(now)
      .bind(now)
      .execute(&self.pool)
      .await?;
    }

    Ok(())
  }

  async fn set_status(
    &self,
    project: &str,
    id: &str,
    status: &RunStatus,
  ) -> Result<(), StoreError> {
    let result = sqlx::query(
      r#"
            UPDATE runs
            SET status = ?, updated_at = ?
            WHERE project = ? AND id = ?
            "#,
    )
    .bind(Json(status))
    .bind(Utc::now())
    .bind(project)
    .bind(id)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(StoreError::NotFound(format!(
        "run '{id}' in project '{project}'"
      )));
    }

    Ok(())
  }
}
