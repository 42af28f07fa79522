use sqlx::{Connection, PgConnection};

use crate::error::Result;

const CREATE_CLIENT_INFO: &str = r#"
    CREATE TABLE IF NOT EXISTS client_info (
        id SERIAL PRIMARY KEY,
        first_name VARCHAR(40) NOT NULL,
        last_name VARCHAR(40) NOT NULL,
        email VARCHAR(254) UNIQUE NOT NULL
    )
"#;

const CREATE_NUMBER_CLIENT: &str = r#"
    CREATE TABLE IF NOT EXISTS number_client (
        id SERIAL PRIMARY KEY,
        phone VARCHAR(20),
        client_id INTEGER NOT NULL REFERENCES client_info(id) ON DELETE CASCADE
    )
"#;

/// Create the client and phone tables if they are missing.
///
/// Safe to call on every start; existing tables and rows are left alone.
pub async fn ensure_schema(conn: &mut PgConnection) -> Result<()> {
    let mut tx = conn.begin().await?;

    sqlx::query(CREATE_CLIENT_INFO).execute(&mut *tx).await?;
    sqlx::query(CREATE_NUMBER_CLIENT).execute(&mut *tx).await?;

    tx.commit().await?;
    tracing::debug!("client directory schema ensured");

    Ok(())
}
