//! Sighting store writes
//!
//! Uniqueness of `id` is enforced by the primary key. Reconciliation relies on
//! `INSERT OR IGNORE`: when two writers race on the same identifier SQLite
//! keeps the first row and silently discards the second.

use super::models::NewSighting;
use crate::Result;
use sqlx::{Executor, Sqlite, SqlitePool};

/// Insert unless a row with the same `id` already exists
///
/// Returns `true` when a new row was written.
pub async fn insert_if_absent<'e, E>(executor: E, sighting: &NewSighting) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO sightings
            (id, observed_at, location, category, category_detail, lat, lng, attachment_ref, source_label)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&sighting.id)
    .bind(sighting.observed_at_text())
    .bind(&sighting.location)
    .bind(&sighting.category)
    .bind(&sighting.category_detail)
    .bind(sighting.lat)
    .bind(sighting.lng)
    .bind(&sighting.attachment_ref)
    .bind(sighting.source_label.as_str())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Insert a direct submission
///
/// Unlike reconciliation, an `id` collision here is a real error.
pub async fn insert_sighting(pool: &SqlitePool, sighting: &NewSighting) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sightings
            (id, observed_at, location, category, category_detail, lat, lng, attachment_ref, source_label)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&sighting.id)
    .bind(sighting.observed_at_text())
    .bind(&sighting.location)
    .bind(&sighting.category)
    .bind(&sighting.category_detail)
    .bind(sighting.lat)
    .bind(sighting.lng)
    .bind(&sighting.attachment_ref)
    .bind(sighting.source_label.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

/// Total number of stored sightings
pub async fn count_sightings(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sightings")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::CityTable;
    use crate::db::init::init_memory_database;
    use crate::db::models::{Sighting, SourceLabel};
    use crate::time::normalize_timestamp;

    fn sighting(id: &str, category: &str) -> NewSighting {
        NewSighting::new(
            id,
            normalize_timestamp("2024-03-01T09:30:00").unwrap(),
            "London",
            Some(category.to_string()),
            None,
            &CityTable::uk_defaults(),
            SourceLabel::System,
        )
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_first_write() {
        let pool = init_memory_database().await.unwrap();

        assert!(insert_if_absent(&pool, &sighting("s1", "Tick")).await.unwrap());
        assert!(!insert_if_absent(&pool, &sighting("s1", "Mite")).await.unwrap());

        assert_eq!(count_sightings(&pool).await.unwrap(), 1);
        let stored: Sighting = sqlx::query_as("SELECT * FROM sightings WHERE id = 's1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored.category, "Tick");
        assert_eq!(stored.observed_at, "2024-03-01T09:30:00");
        assert_eq!(stored.lat, Some(51.5074));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_of_one_id_leave_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let pool = crate::db::init::init_database(&dir.path().join("tick_tracker.db"))
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let pool = pool.clone();
                let category = if i % 2 == 0 { "Tick" } else { "Mite" };
                let s = sighting("race", category);
                tokio::spawn(async move { insert_if_absent(&pool, &s).await })
            })
            .collect();

        let mut written = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                written += 1;
            }
        }

        assert_eq!(written, 1);
        assert_eq!(count_sightings(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_sighting_rejects_duplicate_id() {
        let pool = init_memory_database().await.unwrap();

        insert_sighting(&pool, &sighting("s2", "Tick")).await.unwrap();
        let err = insert_sighting(&pool, &sighting("s2", "Tick")).await;

        assert!(matches!(err, Err(crate::Error::Database(_))));
        assert_eq!(count_sightings(&pool).await.unwrap(), 1);
    }
}
