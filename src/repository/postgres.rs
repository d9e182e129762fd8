use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::Query,
    FromRow, Postgres, Row,
};

use super::{RepoError, Repository};
use crate::{
    database::Database,
    models::{Model, Record},
};

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// A model stored in its own PostgreSQL table. `bind` must bind the domain
/// fields in `FIELDS` order.
pub trait PgModel: Model + for<'r> FromRow<'r, PgRow> {
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;
}

pub struct PgRepository<M> {
    pool: Database,
    _model: PhantomData<fn() -> M>,
}

impl<M: PgModel> PgRepository<M> {
    pub fn new(pool: Database) -> Self {
        Self {
            pool,
            _model: PhantomData,
        }
    }

    fn columns() -> impl Iterator<Item = String> {
        M::FIELDS.iter().map(|field| format!("\"{}\"", field.column))
    }

    fn insert_sql() -> String {
        let columns: Vec<String> = Self::columns().collect();
        let params: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            M::TABLE,
            columns.join(", "),
            params.join(", ")
        )
    }

    fn update_sql() -> String {
        let assignments: Vec<String> = Self::columns()
            .enumerate()
            .map(|(i, column)| format!("{} = ${}", column, i + 1))
            .collect();
        format!(
            "UPDATE {} SET {} WHERE id = ${} RETURNING *",
            M::TABLE,
            assignments.join(", "),
            assignments.len() + 1
        )
    }
}

fn record_from_row<M: PgModel>(row: &PgRow) -> Result<Record<M>, sqlx::Error> {
    Ok(Record {
        id: row.try_get("id")?,
        fields: M::from_row(row)?,
        created_at: row.try_get("Created_At")?,
    })
}

#[async_trait]
impl<M: PgModel> Repository<M> for PgRepository<M> {
    async fn list(&self) -> Result<Vec<Record<M>>, RepoError> {
        let sql = format!("SELECT * FROM {} ORDER BY id", M::TABLE);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| record_from_row(row).map_err(RepoError::from))
            .collect()
    }

    async fn get(&self, id: i64) -> Result<Record<M>, RepoError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", M::TABLE);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::NotFound(id))?;
        Ok(record_from_row(&row)?)
    }

    async fn add(&self, fields: M) -> Result<Record<M>, RepoError> {
        let sql = Self::insert_sql();
        let row = fields
            .bind(sqlx::query(&sql))
            .fetch_one(&self.pool)
            .await?;
        Ok(record_from_row(&row)?)
    }

    async fn update(&self, id: i64, fields: M) -> Result<Record<M>, RepoError> {
        let sql = Self::update_sql();
        let row = fields
            .bind(sqlx::query(&sql))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::NotFound(id))?;
        Ok(record_from_row(&row)?)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", M::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}
