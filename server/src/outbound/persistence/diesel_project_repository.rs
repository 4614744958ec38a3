//! PostgreSQL-backed `ProjectRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::identity::UserId;
use crate::domain::ports::{ProjectRepository, ProjectRepositoryError};
use crate::domain::project::Project;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewProjectRow, ProjectRow, ProjectUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::projects;

/// Diesel-backed implementation of the project repository port.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ProjectRepositoryError {
    map_pool_error(error, ProjectRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> ProjectRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = error {
        return ProjectRepositoryError::duplicate_name();
    }
    map_diesel_error(
        error,
        ProjectRepositoryError::query,
        ProjectRepositoryError::connection,
    )
}

fn decode_rows(rows: Vec<ProjectRow>) -> Result<Vec<Project>, ProjectRepositoryError> {
    rows.into_iter()
        .map(|row| {
            row.into_domain()
                .map_err(|err| ProjectRepositoryError::query(err.to_string()))
        })
        .collect()
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(projects::table)
            .values(NewProjectRow::from(project))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn update(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(projects::table.find(project.id()))
            .set(ProjectUpdate::from(project))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = projects::table
            .filter(projects::slug.eq(slug))
            .select(ProjectRow::as_select())
            .first::<ProjectRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(|row| {
            row.into_domain()
                .map_err(|err| ProjectRepositoryError::query(err.to_string()))
        })
        .transpose()
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows = projects::table
            .order(projects::created_date.desc())
            .limit(limit)
            .select(ProjectRow::as_select())
            .load::<ProjectRow>(&mut conn)
            .await
            .map_err(map_diesel)?;
        decode_rows(rows)
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows = projects::table
            .filter(projects::owner.eq(user.as_str()))
            .order(projects::created_date.desc())
            .select(ProjectRow::as_select())
            .load::<ProjectRow>(&mut conn)
            .await
            .map_err(map_diesel)?;
        decode_rows(rows)
    }

    async fn delete(&self, project_id: Uuid) -> Result<(), ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::delete(projects::table.find(project_id))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }
}
