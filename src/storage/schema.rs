use sqlx::PgPool;

// The items table belongs to the catalog owner; it is only created here so a
// fresh database can accept orders.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    item_id INTEGER PRIMARY KEY,
    name    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    order_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    done     BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE TABLE IF NOT EXISTS order_items (
    order_item_id BIGSERIAL PRIMARY KEY,
    order_id      UUID NOT NULL REFERENCES orders (order_id),
    item_id       INTEGER NOT NULL REFERENCES items (item_id)
);

CREATE INDEX IF NOT EXISTS order_items_order_id_idx ON order_items (order_id);
CREATE INDEX IF NOT EXISTS orders_done_idx ON orders (done);
"#;

/// Create the order tables if they do not exist yet.
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::info!("Order schema is in place");
    Ok(())
}
