#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    pub id: i32,
    pub phone: Option<String>,
    pub client_id: i32,
}
