use sqlx::SqlitePool;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::ConsumptionEvent;

/// Record one consumption event in its own transaction.
pub async fn insert_event(
    db: &SqlitePool,
    user_id: Uuid,
    food_id: i64,
    grams: f64,
    consumed_on: Date,
) -> Result<ConsumptionEvent, sqlx::Error> {
    let mut tx = db.begin().await?;
    let event = sqlx::query_as::<_, ConsumptionEvent>(
        r#"
        INSERT INTO consumption_event (user_id, food_id, grams, consumed_on, recorded_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, user_id, food_id, grams, consumed_on, recorded_at
        "#,
    )
    .bind(user_id)
    .bind(food_id)
    .bind(grams)
    .bind(consumed_on)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(event)
}

/// The user's events, optionally restricted to one day.
pub async fn list_events(
    db: &SqlitePool,
    user_id: Uuid,
    day: Option<Date>,
) -> Result<Vec<ConsumptionEvent>, sqlx::Error> {
    sqlx::query_as::<_, ConsumptionEvent>(
        r#"
        SELECT id, user_id, food_id, grams, consumed_on, recorded_at
          FROM consumption_event
         WHERE user_id = ?1
           AND (?2 IS NULL OR consumed_on = ?2)
         ORDER BY consumed_on, id
        "#,
    )
    .bind(user_id)
    .bind(day)
    .fetch_all(db)
    .await
}

/// Delete an event owned by `user_id`. Returns false when nothing matched.
pub async fn delete_event(db: &SqlitePool, user_id: Uuid, event_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = db.begin().await?;
    let done = sqlx::query(
        r#"
        DELETE FROM consumption_event
         WHERE id = ?1 AND user_id = ?2
        "#,
    )
    .bind(event_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(done.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo_types::User, db};
    use time::macros::date;

    #[tokio::test]
    async fn insert_list_and_delete() {
        let pool = db::memory().await.unwrap();
        let alice = User::create(&pool, "alice", "hash").await.unwrap();
        let bob = User::create(&pool, "bob", "hash").await.unwrap();

        let first = insert_event(&pool, alice.id, 1, 30.0, date!(2024 - 05 - 01)).await.unwrap();
        insert_event(&pool, alice.id, 1455, 150.0, date!(2024 - 05 - 02)).await.unwrap();
        insert_event(&pool, bob.id, 2, 20.0, date!(2024 - 05 - 01)).await.unwrap();

        assert_eq!(first.consumed_on, date!(2024 - 05 - 01));
        assert_eq!(first.user_id, alice.id);

        let all = list_events(&pool, alice.id, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);

        let day = list_events(&pool, alice.id, Some(date!(2024 - 05 - 02))).await.unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].food_id, 1455);

        // Bob cannot delete Alice's entry.
        assert!(!delete_event(&pool, bob.id, first.id).await.unwrap());
        assert!(delete_event(&pool, alice.id, first.id).await.unwrap());
        assert!(!delete_event(&pool, alice.id, first.id).await.unwrap());
        assert_eq!(list_events(&pool, alice.id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn store_rejects_unknown_food() {
        let pool = db::memory().await.unwrap();
        let alice = User::create(&pool, "alice", "hash").await.unwrap();
        assert!(insert_event(&pool, alice.id, 987_654, 10.0, date!(2024 - 05 - 01))
            .await
            .is_err());
    }
}
