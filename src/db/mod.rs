mod clients;
mod query;
mod schema;

use sqlx::{Connection, PgConnection};

use crate::config::Config;
use crate::error::Result;
use crate::models::{Client, ClientChanges, ClientFilter, PhoneNumber, Phones};

pub use clients::{
    add_client, add_phone, change_client, delete_client, delete_phone, find_client, get_client,
    get_phones,
};
pub use schema::ensure_schema;

/// A single database connection with the directory operations on it.
///
/// Every method runs in its own transaction on the owned connection.
pub struct Directory {
    conn: PgConnection,
}

impl Directory {
    /// Open a connection to the given PostgreSQL URL
    pub async fn connect(database_url: &str) -> Result<Self> {
        let conn = PgConnection::connect(database_url).await?;
        Ok(Self { conn })
    }

    /// Wrap a connection the caller already opened
    pub fn from_connection(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// Get mutable access to the underlying connection
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    pub async fn ensure_schema(&mut self) -> Result<()> {
        ensure_schema(&mut self.conn).await
    }

    pub async fn add_client(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: &str,
        phones: Option<Phones>,
    ) -> Result<i32> {
        add_client(&mut self.conn, first_name, last_name, email, phones).await
    }

    pub async fn add_phone(&mut self, client_id: i32, phone: &str) -> Result<i32> {
        add_phone(&mut self.conn, client_id, phone).await
    }

    pub async fn change_client(&mut self, client_id: i32, changes: &ClientChanges) -> Result<()> {
        change_client(&mut self.conn, client_id, changes).await
    }

    pub async fn delete_phone(&mut self, client_id: i32, phone: &str) -> Result<u64> {
        delete_phone(&mut self.conn, client_id, phone).await
    }

    pub async fn delete_client(&mut self, client_id: i32) -> Result<u64> {
        delete_client(&mut self.conn, client_id).await
    }

    pub async fn find_client(&mut self, filter: &ClientFilter) -> Result<Vec<Client>> {
        find_client(&mut self.conn, filter).await
    }

    pub async fn get_client(&mut self, client_id: i32) -> Result<Option<Client>> {
        get_client(&mut self.conn, client_id).await
    }

    pub async fn get_phones(&mut self, client_id: i32) -> Result<Vec<PhoneNumber>> {
        get_phones(&mut self.conn, client_id).await
    }
}

/// Connect using the loaded configuration and make sure the tables exist
pub async fn init(config: &Config) -> Result<Directory> {
    let mut directory = Directory::connect(config.database_url()).await?;
    directory.ensure_schema().await?;

    Ok(directory)
}
