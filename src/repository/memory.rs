use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{RepoError, Repository};
use crate::models::{Model, Record};

struct Collection<M> {
    next_id: i64,
    records: Vec<Record<M>>,
}

/// Process-local store. Ids come from a counter starting at 1 and are never
/// reused, even after a delete.
pub struct MemoryRepository<M> {
    collection: RwLock<Collection<M>>,
}

impl<M> MemoryRepository<M> {
    pub fn new() -> Self {
        Self {
            collection: RwLock::new(Collection {
                next_id: 1,
                records: Vec::new(),
            }),
        }
    }
}

impl<M> Default for MemoryRepository<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M: Model> Repository<M> for MemoryRepository<M> {
    async fn list(&self) -> Result<Vec<Record<M>>, RepoError> {
        Ok(self.collection.read().await.records.clone())
    }

    async fn get(&self, id: i64) -> Result<Record<M>, RepoError> {
        self.collection
            .read()
            .await
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepoError::NotFound(id))
    }

    async fn add(&self, fields: M) -> Result<Record<M>, RepoError> {
        let mut collection = self.collection.write().await;
        let record = Record {
            id: collection.next_id,
            fields,
            created_at: Utc::now(),
        };
        collection.next_id += 1;
        collection.records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, fields: M) -> Result<Record<M>, RepoError> {
        let mut collection = self.collection.write().await;
        let record = collection
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepoError::NotFound(id))?;
        record.fields = fields;
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut collection = self.collection.write().await;
        let index = collection
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(RepoError::NotFound(id))?;
        collection.records.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, EmployeeStatus};

    fn employee(name: &str) -> Employee {
        Employee {
            name: name.to_string(),
            email: format!("{}@aero.example", name.to_lowercase()),
            department: "Engineering".into(),
            position: "Machinist".into(),
            phone: "555-0100".into(),
            join_date: None,
            status: EmployeeStatus::Active,
        }
    }

    #[tokio::test]
    async fn add_appends_one_record_with_a_fresh_id() {
        let repo = MemoryRepository::<Employee>::new();
        let first = repo.add(employee("Ada")).await.unwrap();
        let before = repo.list().await.unwrap();

        let second = repo.add(employee("Grace")).await.unwrap();
        let after = repo.list().await.unwrap();

        assert_eq!(after.len(), before.len() + 1);
        assert_ne!(first.id, second.id);
        assert_eq!(after.last().unwrap().fields, employee("Grace"));
    }

    #[tokio::test]
    async fn update_touches_only_the_matching_record() {
        let repo = MemoryRepository::<Employee>::new();
        let ada = repo.add(employee("Ada")).await.unwrap();
        let grace = repo.add(employee("Grace")).await.unwrap();

        let mut changed = employee("Ada");
        changed.position = "Lead Machinist".into();
        let updated = repo.update(ada.id, changed.clone()).await.unwrap();

        assert_eq!(updated.created_at, ada.created_at);
        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].fields, changed);
        assert_eq!(all[1], grace);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_record() {
        let repo = MemoryRepository::<Employee>::new();
        let ada = repo.add(employee("Ada")).await.unwrap();
        let grace = repo.add(employee("Grace")).await.unwrap();

        repo.delete(ada.id).await.unwrap();

        assert_eq!(repo.list().await.unwrap(), vec![grace]);
    }

    #[tokio::test]
    async fn missing_ids_are_reported_and_nothing_changes() {
        let repo = MemoryRepository::<Employee>::new();
        let ada = repo.add(employee("Ada")).await.unwrap();

        assert!(matches!(repo.get(99).await, Err(RepoError::NotFound(99))));
        assert!(matches!(
            repo.update(99, employee("Nobody")).await,
            Err(RepoError::NotFound(99))
        ));
        assert!(matches!(repo.delete(99).await, Err(RepoError::NotFound(99))));
        assert_eq!(repo.list().await.unwrap(), vec![ada]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = MemoryRepository::<Employee>::new();
        let ada = repo.add(employee("Ada")).await.unwrap();
        repo.delete(ada.id).await.unwrap();
        let grace = repo.add(employee("Grace")).await.unwrap();
        assert!(grace.id > ada.id);
    }
}
