use sqlx::{Connection, PgConnection};

use super::query;
use crate::error::Result;
use crate::models::{Client, ClientChanges, ClientFilter, PhoneNumber, Phones};

async fn insert_phones(conn: &mut PgConnection, client_id: i32, phones: &Phones) -> Result<()> {
    for phone in phones.iter() {
        sqlx::query("INSERT INTO number_client (phone, client_id) VALUES ($1, $2)")
            .bind(phone)
            .bind(client_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Insert a client and its initial phones in one transaction, returning the
/// new client id. A duplicate email leaves no rows behind.
pub async fn add_client(
    conn: &mut PgConnection,
    first_name: &str,
    last_name: &str,
    email: &str,
    phones: Option<Phones>,
) -> Result<i32> {
    let mut tx = conn.begin().await?;

    let client_id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO client_info (first_name, last_name, email)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(phones) = &phones {
        insert_phones(&mut *tx, client_id, phones).await?;
    }

    tx.commit().await?;
    tracing::info!(
        client_id,
        phones = phones.as_ref().map_or(0, Phones::len),
        "client added"
    );

    Ok(client_id)
}

/// Attach one more phone to an existing client, returning the phone row id.
pub async fn add_phone(conn: &mut PgConnection, client_id: i32, phone: &str) -> Result<i32> {
    let mut tx = conn.begin().await?;

    let phone_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO number_client (phone, client_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(phone)
    .bind(client_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(client_id, phone_id, "phone added");

    Ok(phone_id)
}

/// Apply a partial update. Client fields are rewritten only when supplied;
/// a supplied phone set replaces every existing phone. An unknown id
/// affects nothing and is not an error.
pub async fn change_client(conn: &mut PgConnection, client_id: i32, changes: &ClientChanges) -> Result<()> {
    let mut tx = conn.begin().await?;

    if let Some(mut update) = query::update_client(client_id, changes) {
        let updated = update.build().execute(&mut *tx).await?.rows_affected();
        tracing::debug!(client_id, updated, "client fields updated");
    }

    if let Some(phones) = &changes.phones {
        let removed = sqlx::query("DELETE FROM number_client WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        insert_phones(&mut *tx, client_id, phones).await?;
        tracing::debug!(client_id, removed, inserted = phones.len(), "phones replaced");
    }

    tx.commit().await?;
    tracing::info!(client_id, "client changed");

    Ok(())
}

/// Remove every phone row of the client equal to `phone`. Returns the number
/// of rows removed; zero is a successful no-op.
pub async fn delete_phone(conn: &mut PgConnection, client_id: i32, phone: &str) -> Result<u64> {
    let mut tx = conn.begin().await?;

    let removed = sqlx::query("DELETE FROM number_client WHERE client_id = $1 AND phone = $2")
        .bind(client_id)
        .bind(phone)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    tracing::info!(client_id, removed, "phone deleted");

    Ok(removed)
}

/// Remove a client; its phones go with it through the cascading key.
pub async fn delete_client(conn: &mut PgConnection, client_id: i32) -> Result<u64> {
    let mut tx = conn.begin().await?;

    let removed = sqlx::query("DELETE FROM client_info WHERE id = $1")
        .bind(client_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    tracing::info!(client_id, removed, "client deleted");

    Ok(removed)
}

pub async fn find_client(conn: &mut PgConnection, filter: &ClientFilter) -> Result<Vec<Client>> {
    let mut search = query::find_clients(filter);
    let clients = search
        .build_query_as::<Client>()
        .fetch_all(&mut *conn)
        .await?;

    tracing::debug!(matches = clients.len(), "client search");

    Ok(clients)
}

pub async fn get_client(conn: &mut PgConnection, client_id: i32) -> Result<Option<Client>> {
    let client = sqlx::query_as::<_, Client>(
        "SELECT id, first_name, last_name, email FROM client_info WHERE id = $1",
    )
    .bind(client_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(client)
}

pub async fn get_phones(conn: &mut PgConnection, client_id: i32) -> Result<Vec<PhoneNumber>> {
    let phones = sqlx::query_as::<_, PhoneNumber>(
        "SELECT id, phone, client_id FROM number_client WHERE client_id = $1 ORDER BY id ASC",
    )
    .bind(client_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(phones)
}
