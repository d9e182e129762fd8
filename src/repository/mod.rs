pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    database::Database,
    models::{
        AttendanceRecord, Employee, LeaveRequest, Model, ProductionRecord, RawMaterial, Record,
        StockRequest, ToolStock,
    },
};

use memory::MemoryRepository;
use postgres::PgRepository;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("no record with id {0}")]
    NotFound(i64),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// The owning collection for one entity type.
#[async_trait]
pub trait Repository<M: Model>: Send + Sync {
    /// All records in insertion order.
    async fn list(&self) -> Result<Vec<Record<M>>, RepoError>;

    async fn get(&self, id: i64) -> Result<Record<M>, RepoError>;

    /// Stores `fields` under a fresh id and creation time.
    async fn add(&self, fields: M) -> Result<Record<M>, RepoError>;

    /// Replaces every domain field; id and creation time are kept.
    async fn update(&self, id: i64, fields: M) -> Result<Record<M>, RepoError>;

    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

/// One repository per entity type, shared by the API and the portal pages.
#[derive(Clone)]
pub struct Repositories {
    pub employees: Arc<dyn Repository<Employee>>,
    pub attendance: Arc<dyn Repository<AttendanceRecord>>,
    pub leave: Arc<dyn Repository<LeaveRequest>>,
    pub tool_stocks: Arc<dyn Repository<ToolStock>>,
    pub stock_requests: Arc<dyn Repository<StockRequest>>,
    pub raw_materials: Arc<dyn Repository<RawMaterial>>,
    pub production: Arc<dyn Repository<ProductionRecord>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            employees: Arc::new(MemoryRepository::<Employee>::new()),
            attendance: Arc::new(MemoryRepository::<AttendanceRecord>::new()),
            leave: Arc::new(MemoryRepository::<LeaveRequest>::new()),
            tool_stocks: Arc::new(MemoryRepository::<ToolStock>::new()),
            stock_requests: Arc::new(MemoryRepository::<StockRequest>::new()),
            raw_materials: Arc::new(MemoryRepository::<RawMaterial>::new()),
            production: Arc::new(MemoryRepository::<ProductionRecord>::new()),
        }
    }

    pub fn postgres(pool: Database) -> Self {
        Self {
            employees: Arc::new(PgRepository::<Employee>::new(pool.clone())),
            attendance: Arc::new(PgRepository::<AttendanceRecord>::new(pool.clone())),
            leave: Arc::new(PgRepository::<LeaveRequest>::new(pool.clone())),
            tool_stocks: Arc::new(PgRepository::<ToolStock>::new(pool.clone())),
            stock_requests: Arc::new(PgRepository::<StockRequest>::new(pool.clone())),
            raw_materials: Arc::new(PgRepository::<RawMaterial>::new(pool.clone())),
            production: Arc::new(PgRepository::<ProductionRecord>::new(pool)),
        }
    }

    pub fn of<M: Model>(&self) -> Arc<dyn Repository<M>> {
        M::repository(self)
    }
}
