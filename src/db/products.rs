use rusqlite::params;
use uuid::Uuid;

use super::{column_datetime, now_millis, to_datetime, DbResult, Database};
use crate::models::{NewProduct, Product};

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, mrp, msp, front_image, side_image, back_image, seller_id, created_at, updated_at";

/// Insert every product for `seller_id` in one transaction and bump the seller's `updated_at`.
///
/// Either all rows land or none do.
pub fn insert_batch(db: &Database, seller_id: &str, batch: &[NewProduct]) -> DbResult<Vec<Product>> {
    db.with_conn(|conn| {
        let tx = conn.transaction()?;
        let now = now_millis();
        let at = to_datetime(now)?;
        let mut created = Vec::with_capacity(batch.len());

        {
            let mut insert = tx.prepare(
                "INSERT INTO products
                    (id, name, mrp, msp, front_image, side_image, back_image, seller_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            )?;
            for product in batch {
                let id = Uuid::new_v4().to_string();
                insert.execute(params![
                    id,
                    product.name,
                    product.mrp,
                    product.msp,
                    product.front_image,
                    product.side_image,
                    product.back_image,
                    seller_id,
                    now
                ])?;
                created.push(Product {
                    id,
                    name: product.name.clone(),
                    mrp: product.mrp,
                    msp: product.msp,
                    front_image: product.front_image.clone(),
                    side_image: product.side_image.clone(),
                    back_image: product.back_image.clone(),
                    seller_id: seller_id.to_string(),
                    created_at: at,
                    updated_at: at,
                });
            }
        }

        tx.execute(
            "UPDATE sellers SET updated_at = ?1 WHERE id = ?2",
            params![now, seller_id],
        )?;
        tx.commit()?;

        tracing::debug!(seller_id, count = created.len(), "Inserted product batch");
        Ok(created)
    })
}

/// Products for a seller, newest first
pub fn list_for_seller(db: &Database, seller_id: &str) -> DbResult<Vec<Product>> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM products WHERE seller_id = ?1 ORDER BY created_at DESC, rowid DESC",
            PRODUCT_COLUMNS
        ))?;
        let products = stmt
            .query_map([seller_id], row_to_product)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    })
}

/// Delete a product. Returns false when no such product exists.
pub fn delete(db: &Database, id: &str) -> DbResult<bool> {
    db.with_conn(|conn| Ok(conn.execute("DELETE FROM products WHERE id = ?1", [id])? > 0))
}

pub(crate) fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        mrp: row.get(2)?,
        msp: row.get(3)?,
        front_image: row.get(4)?,
        side_image: row.get(5)?,
        back_image: row.get(6)?,
        seller_id: row.get(7)?,
        created_at: column_datetime(row, 8)?,
        updated_at: column_datetime(row, 9)?,
    })
}
