//! # Counterparty Repositories
//!
//! Customers and suppliers share one implementation over the [`Person`]
//! trait. Records are never removed: `soft_delete` flips `is_active`.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::marker::PhantomData;
use tracing::debug;
use uuid::Uuid;

use super::sortable_timestamp;
use crate::error::{DbError, DbResult};
use stockroom_core::validation::validate_person;
use stockroom_core::{Customer, Person, Supplier};

/// A person record stored in a table of its own.
pub trait CounterpartyRecord: Person + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;
    const ENTITY: &'static str;
}

impl CounterpartyRecord for Customer {
    const TABLE: &'static str = "customers";
    const ENTITY: &'static str = "Customer";
}

impl CounterpartyRecord for Supplier {
    const TABLE: &'static str = "suppliers";
    const ENTITY: &'static str = "Supplier";
}

/// Repository for one kind of counterparty.
#[derive(Debug, Clone)]
pub struct CounterpartyRepository<P> {
    pool: SqlitePool,
    _record: PhantomData<P>,
}

pub type CustomerRepository = CounterpartyRepository<Customer>;
pub type SupplierRepository = CounterpartyRepository<Supplier>;

impl<P: CounterpartyRecord> CounterpartyRepository<P> {
    pub fn new(pool: SqlitePool) -> Self {
        CounterpartyRepository {
            pool,
            _record: PhantomData,
        }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<P>> {
        let sql = format!("SELECT body FROM {} WHERE id = ?1", P::TABLE);
        let body: Option<String> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(body.map(|b| serde_json::from_str(&b)).transpose()?)
    }

    /// Active records ordered by name.
    pub async fn list_active(&self) -> DbResult<Vec<P>> {
        let sql = format!(
            "SELECT body FROM {} WHERE is_active = 1 ORDER BY name, id",
            P::TABLE
        );
        let bodies: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        bodies
            .iter()
            .map(|b| serde_json::from_str(b).map_err(DbError::from))
            .collect()
    }

    /// Inserts or replaces a record, assigning an id when empty.
    pub async fn save(&self, mut record: P) -> DbResult<P> {
        validate_person(&record)?;
        if record.id().is_empty() {
            record.set_id(Uuid::new_v4().to_string());
        }

        debug!(entity = P::ENTITY, id = %record.id(), "Saving counterparty");
        self.write(&record).await?;
        Ok(record)
    }

    /// Marks a record inactive. It stays readable by id.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let mut record = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found(P::ENTITY, id))?;

        debug!(entity = P::ENTITY, id = %id, "Deactivating counterparty");
        record.set_active(false);
        self.write(&record).await
    }

    async fn write(&self, record: &P) -> DbResult<()> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, name, is_active, body, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                is_active = excluded.is_active,
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
            P::TABLE
        );
        sqlx::query(&sql)
            .bind(record.id())
            .bind(record.name())
            .bind(record.is_active())
            .bind(serde_json::to_string(record)?)
            .bind(sortable_timestamp(Utc::now()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use stockroom_core::{Customer, Person, Supplier};

    #[tokio::test]
    async fn test_soft_delete_hides_from_active_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let kept = repo
            .save(Customer {
                name: "Zara".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let gone = repo
            .save(Customer {
                name: "Adeel".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(repo.list_active().await.unwrap().len(), 2);

        repo.soft_delete(&gone.id).await.unwrap();
        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, kept.id);

        let still_there = repo.get_by_id(&gone.id).await.unwrap().unwrap();
        assert!(!still_there.is_active());
    }

    #[tokio::test]
    async fn test_suppliers_use_their_own_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = db
            .suppliers()
            .save(Supplier {
                name: "Metro".to_string(),
                contact_number: "+923001234567".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(db.customers().get_by_id(&supplier.id).await.unwrap().is_none());
        assert_eq!(db.suppliers().list_active().await.unwrap()[0].name(), "Metro");
    }

    #[tokio::test]
    async fn test_invalid_and_missing_records() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let result = db.customers().save(Customer::default()).await;
        assert!(matches!(result, Err(DbError::Validation(_))));
        assert!(db.suppliers().soft_delete("nope").await.unwrap_err().is_not_found());
    }
}
