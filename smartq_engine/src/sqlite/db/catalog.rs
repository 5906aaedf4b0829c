use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::db_types::{MenuItem, Vendor};

pub async fn fetch_vendors(conn: &mut SqliteConnection) -> Result<Vec<Vendor>, sqlx::Error> {
    let vendors = sqlx::query_as("SELECT * FROM vendors ORDER BY name").fetch_all(conn).await?;
    Ok(vendors)
}

pub async fn fetch_vendor(vendor_id: &str, conn: &mut SqliteConnection) -> Result<Option<Vendor>, sqlx::Error> {
    let vendor = sqlx::query_as("SELECT * FROM vendors WHERE id = $1").bind(vendor_id).fetch_optional(conn).await?;
    Ok(vendor)
}

pub async fn fetch_menu_for_vendor(
    vendor_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<MenuItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM menu_items WHERE vendor_id = $1 ORDER BY category, name")
        .bind(vendor_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Fetches the given menu items, restricted to one vendor. Unknown ids are simply absent from the result.
pub async fn fetch_menu_items_by_ids(
    vendor_id: &str,
    item_ids: &[String],
    conn: &mut SqliteConnection,
) -> Result<Vec<MenuItem>, sqlx::Error> {
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM menu_items WHERE vendor_id = ");
    builder.push_bind(vendor_id);
    builder.push(" AND id IN (");
    let mut separated = builder.separated(", ");
    for id in item_ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");
    let items = builder.build_query_as().fetch_all(conn).await?;
    Ok(items)
}
