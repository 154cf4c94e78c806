use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{column_datetime, now_millis, DbResult, Database};
use crate::models::User;
use crate::session::UserStats;

/// Whether the upsert created, renamed or left the user untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Renamed,
    Unchanged,
}

/// Find a user by phone, creating it if missing and updating its name if it changed
pub fn upsert_by_phone(db: &Database, name: &str, phone: &str) -> DbResult<(User, Upsert)> {
    db.with_conn(|conn| {
        let existing: Option<(String, String)> = conn
            .query_row(
                "SELECT id, name FROM users WHERE phone = ?1",
                [phone],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let now = now_millis();
        let (id, outcome) = match existing {
            None => {
                let id = Uuid::new_v4().to_string();
                conn.execute(
                    "INSERT INTO users (id, name, phone, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![id, name, phone, now],
                )?;
                (id, Upsert::Created)
            }
            Some((id, current)) if current != name => {
                conn.execute(
                    "UPDATE users SET name = ?1, updated_at = ?2 WHERE id = ?3",
                    params![name, now, id],
                )?;
                (id, Upsert::Renamed)
            }
            Some((id, _)) => (id, Upsert::Unchanged),
        };

        let user = fetch(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok((user, outcome))
    })
}

pub fn get(db: &Database, id: &str) -> DbResult<Option<User>> {
    db.with_conn(|conn| fetch(conn, id))
}

pub fn exists(db: &Database, id: &str) -> DbResult<bool> {
    db.with_conn(|conn| {
        Ok(conn
            .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
            .optional()?
            .is_some())
    })
}

fn fetch(conn: &Connection, id: &str) -> DbResult<Option<User>> {
    let row = conn
        .query_row(
            "SELECT id, name, phone, created_at, updated_at FROM users WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    column_datetime(row, 3)?,
                    column_datetime(row, 4)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, phone, created_at, updated_at)) = row else {
        return Ok(None);
    };
    let stats = stats(conn, &id)?;
    Ok(Some(User {
        id,
        name,
        phone,
        created_at,
        updated_at,
        stats,
    }))
}

/// Seller and product totals plus the latest activity across the user's records
fn stats(conn: &Connection, user_id: &str) -> DbResult<UserStats> {
    let stats = conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM sellers WHERE user_id = ?1),
            (SELECT COUNT(*) FROM products p JOIN sellers s ON s.id = p.seller_id
                WHERE s.user_id = ?1),
            MAX(
                u.updated_at,
                COALESCE((SELECT MAX(updated_at) FROM sellers WHERE user_id = ?1), 0),
                COALESCE((SELECT MAX(p.created_at) FROM products p
                    JOIN sellers s ON s.id = p.seller_id WHERE s.user_id = ?1), 0)
            )
         FROM users u WHERE u.id = ?1",
        [user_id],
        |row| {
            Ok(UserStats {
                total_sellers: row.get::<_, i64>(0)?.max(0) as u64,
                total_products: row.get::<_, i64>(1)?.max(0) as u64,
                last_active: row.get(2)?,
            })
        },
    )?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    #[test]
    fn test_creates_missing_user() {
        let db = Database::open_in_memory().unwrap();
        let (user, outcome) = upsert_by_phone(&db, "Alice", "9876543210").unwrap();
        assert_eq!(outcome, Upsert::Created);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.stats.total_sellers, 0);
        assert!(exists(&db, &user.id).unwrap());
    }

    #[test]
    fn test_same_phone_returns_same_user() {
        let db = Database::open_in_memory().unwrap();
        let (first, _) = upsert_by_phone(&db, "Alice", "9876543210").unwrap();
        let (second, outcome) = upsert_by_phone(&db, "Alice", "9876543210").unwrap();
        assert_eq!(outcome, Upsert::Unchanged);
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_name_change_updates_record() {
        let db = Database::open_in_memory().unwrap();
        let (first, _) = upsert_by_phone(&db, "Alice", "9876543210").unwrap();
        let (renamed, outcome) = upsert_by_phone(&db, "Alicia", "9876543210").unwrap();
        assert_eq!(outcome, Upsert::Renamed);
        assert_eq!(renamed.id, first.id);
        assert_eq!(renamed.name, "Alicia");
        assert_eq!(get(&db, &first.id).unwrap().unwrap().name, "Alicia");
    }

    #[test]
    fn test_stats_count_sellers_and_products() {
        let db = Database::open_in_memory().unwrap();
        let user = test_support::user(&db, "9876543210");
        let seller = test_support::seller(&db, &user.id, "Corner Store");
        test_support::seller(&db, &user.id, "Second Store");
        crate::db::products::insert_batch(
            &db,
            &seller.id,
            &[test_support::product("Tea"), test_support::product("Rice")],
        )
        .unwrap();

        let user = get(&db, &user.id).unwrap().unwrap();
        assert_eq!(user.stats.total_sellers, 2);
        assert_eq!(user.stats.total_products, 2);
        assert!(user.stats.last_active >= user.updated_at.timestamp_millis());
    }

    #[test]
    fn test_get_missing() {
        let db = Database::open_in_memory().unwrap();
        assert!(get(&db, "nope").unwrap().is_none());
        assert!(!exists(&db, "nope").unwrap());
    }
}
