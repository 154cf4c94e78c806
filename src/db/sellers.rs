use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{column_datetime, now_millis, to_datetime, DbResult, Database};
use crate::models::{CreateSellerRequest, Seller};

const SELLER_COLUMNS: &str =
    "id, name, phone, gst_number, shop_image, user_id, created_at, updated_at";

pub fn create(db: &Database, request: &CreateSellerRequest) -> DbResult<Seller> {
    db.with_conn(|conn| {
        let id = Uuid::new_v4().to_string();
        let now = now_millis();
        conn.execute(
            "INSERT INTO sellers (id, name, phone, gst_number, shop_image, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                id,
                request.name,
                request.phone,
                request.gst_number,
                request.shop_image,
                request.user_id,
                now
            ],
        )?;

        let at = to_datetime(now)?;
        Ok(Seller {
            id,
            name: request.name.clone(),
            phone: request.phone.clone(),
            gst_number: request.gst_number.clone(),
            shop_image: request.shop_image.clone(),
            user_id: request.user_id.clone(),
            created_at: at,
            updated_at: at,
        })
    })
}

pub fn get(db: &Database, id: &str) -> DbResult<Option<Seller>> {
    db.with_conn(|conn| fetch(conn, id))
}

pub fn exists(db: &Database, id: &str) -> DbResult<bool> {
    db.with_conn(|conn| {
        Ok(conn
            .query_row("SELECT 1 FROM sellers WHERE id = ?1", [id], |_| Ok(()))
            .optional()?
            .is_some())
    })
}

pub fn list_for_user(db: &Database, user_id: &str) -> DbResult<Vec<Seller>> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sellers WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            SELLER_COLUMNS
        ))?;
        let sellers = stmt
            .query_map([user_id], row_to_seller)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sellers)
    })
}

fn fetch(conn: &Connection, id: &str) -> DbResult<Option<Seller>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM sellers WHERE id = ?1", SELLER_COLUMNS),
            [id],
            row_to_seller,
        )
        .optional()?)
}

pub(crate) fn row_to_seller(row: &rusqlite::Row<'_>) -> rusqlite::Result<Seller> {
    Ok(Seller {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        gst_number: row.get(3)?,
        shop_image: row.get(4)?,
        user_id: row.get(5)?,
        created_at: column_datetime(row, 6)?,
        updated_at: column_datetime(row, 7)?,
    })
}
