use std::collections::BTreeMap;

use sqlx::SqlitePool;
use uuid::Uuid;

use super::repo_types::{DriUpdate, JoinedDri};

/// Every catalog nutrient, left-joined with this user's targets.
pub async fn joined_dri(db: &SqlitePool, user_id: Uuid) -> Result<Vec<JoinedDri>, sqlx::Error> {
    sqlx::query_as::<_, JoinedDri>(
        r#"
        SELECT n.nutrient_id, n.name, n.unit, ud.dri
          FROM nutrient_name n
          LEFT JOIN user_dri ud
            ON ud.nutrient_id = n.nutrient_id
           AND ud.user_id = ?1
         ORDER BY n.nutrient_id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// nutrient id -> DRI (None when unset), for every catalog nutrient.
pub async fn dri_by_nutrient(
    db: &SqlitePool,
    user_id: Uuid,
) -> Result<BTreeMap<i64, Option<f64>>, sqlx::Error> {
    Ok(joined_dri(db, user_id)
        .await?
        .into_iter()
        .map(|row| (row.nutrient_id, row.dri))
        .collect())
}

/// Insert or replace the given targets in one transaction.
pub async fn upsert_many(
    db: &SqlitePool,
    user_id: Uuid,
    entries: &[DriUpdate],
) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;
    for entry in entries {
        sqlx::query(
            r#"
            INSERT INTO user_dri (user_id, nutrient_id, dri)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id, nutrient_id) DO UPDATE SET dri = excluded.dri
            "#,
        )
        .bind(user_id)
        .bind(entry.nutrient_id)
        .bind(entry.dri)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn delete(db: &SqlitePool, user_id: Uuid, nutrient_id: i64) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM user_dri WHERE user_id = ?1 AND nutrient_id = ?2")
        .bind(user_id)
        .bind(nutrient_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo_types::User, db};

    fn update(nutrient_id: i64, dri: f64) -> DriUpdate {
        DriUpdate { nutrient_id, dri }
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_nutrient() {
        let pool = db::memory().await.unwrap();
        let alice = User::create(&pool, "alice", "hash").await.unwrap();

        upsert_many(&pool, alice.id, &[update(203, 50.0), update(204, 70.0)]).await.unwrap();
        upsert_many(&pool, alice.id, &[update(203, 56.0)]).await.unwrap();

        let (rows,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_dri WHERE user_id = ?1 AND nutrient_id = 203")
                .bind(alice.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(rows, 1);

        let map = dri_by_nutrient(&pool, alice.id).await.unwrap();
        assert_eq!(map[&203], Some(56.0));
        assert_eq!(map[&204], Some(70.0));
        assert_eq!(map[&301], None);
    }

    #[tokio::test]
    async fn targets_are_per_user() {
        let pool = db::memory().await.unwrap();
        let alice = User::create(&pool, "alice", "hash").await.unwrap();
        let bob = User::create(&pool, "bob", "hash").await.unwrap();

        upsert_many(&pool, alice.id, &[update(203, 50.0)]).await.unwrap();

        let bobs = joined_dri(&pool, bob.id).await.unwrap();
        assert!(bobs.iter().all(|row| row.dri.is_none()));
        assert_eq!(bobs.len(), crate::catalog::repo::list_nutrients(&pool).await.unwrap().len());
    }

    #[tokio::test]
    async fn failed_batch_leaves_nothing_behind() {
        let pool = db::memory().await.unwrap();
        let alice = User::create(&pool, "alice", "hash").await.unwrap();

        // 999 is not in the catalog, so the foreign key aborts the batch.
        let res = upsert_many(&pool, alice.id, &[update(203, 50.0), update(999, 1.0)]).await;
        assert!(res.is_err());

        let map = dri_by_nutrient(&pool, alice.id).await.unwrap();
        assert_eq!(map[&203], None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let pool = db::memory().await.unwrap();
        let alice = User::create(&pool, "alice", "hash").await.unwrap();
        upsert_many(&pool, alice.id, &[update(203, 50.0)]).await.unwrap();

        delete(&pool, alice.id, 203).await.unwrap();
        delete(&pool, alice.id, 203).await.unwrap();
        assert_eq!(dri_by_nutrient(&pool, alice.id).await.unwrap()[&203], None);
    }
}
