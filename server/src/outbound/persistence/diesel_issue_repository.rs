//! PostgreSQL-backed `IssueRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::issue::Issue;
use crate::domain::ports::{IssueRepository, IssueRepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{IssueRow, IssueUpdate, NewIssueRow};
use super::pool::{DbPool, PoolError};
use super::schema::issues;

/// Diesel-backed implementation of the issue repository port.
#[derive(Clone)]
pub struct DieselIssueRepository {
    pool: DbPool,
}

impl DieselIssueRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> IssueRepositoryError {
    map_pool_error(error, IssueRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> IssueRepositoryError {
    map_diesel_error(
        error,
        IssueRepositoryError::query,
        IssueRepositoryError::connection,
    )
}

fn decode_row(row: IssueRow) -> Result<Issue, IssueRepositoryError> {
    row.into_domain()
        .map_err(|err| IssueRepositoryError::query(err.to_string()))
}

#[async_trait]
impl IssueRepository for DieselIssueRepository {
    async fn insert(&self, issue: &Issue) -> Result<(), IssueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(issues::table)
            .values(NewIssueRow::from(issue))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn update(&self, issue: &Issue) -> Result<(), IssueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(issues::table.find(issue.id()))
            .set(IssueUpdate::from(issue))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn find_by_internal_url(
        &self,
        internal_url: &str,
    ) -> Result<Option<Issue>, IssueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = issues::table
            .filter(issues::internal_url.eq(internal_url))
            .order(issues::created_date.asc())
            .select(IssueRow::as_select())
            .first::<IssueRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(decode_row).transpose()
    }

    async fn find_by_identifier(
        &self,
        project_id: Uuid,
        identifier: i64,
    ) -> Result<Option<Issue>, IssueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = issues::table
            .filter(issues::project_id.eq(project_id))
            .filter(issues::identifier.eq(identifier))
            .select(IssueRow::as_select())
            .first::<IssueRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(decode_row).transpose()
    }

    async fn list_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<Issue>, IssueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows = issues::table
            .filter(issues::project_id.eq(project_id))
            .order(issues::created_date.desc())
            .select(IssueRow::as_select())
            .load::<IssueRow>(&mut conn)
            .await
            .map_err(map_diesel)?;
        rows.into_iter().map(decode_row).collect()
    }

    async fn delete(&self, issue_id: Uuid) -> Result<(), IssueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::delete(issues::table.find(issue_id))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }
}
