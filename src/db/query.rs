//! Statement builders for the operations whose SQL depends on which
//! optional fields the caller supplied. Values are always bound, never
//! spliced into the statement text.

use sqlx::{Postgres, QueryBuilder};

use crate::models::{ClientChanges, ClientFilter};

const SELECT_CLIENTS: &str = "SELECT DISTINCT ci.id, ci.first_name, ci.last_name, ci.email \
     FROM client_info ci \
     LEFT JOIN number_client nc ON ci.id = nc.client_id";

/// `UPDATE client_info SET ...` for the supplied fields only.
/// Returns `None` when no client field is being changed.
pub fn update_client(client_id: i32, changes: &ClientChanges) -> Option<QueryBuilder<'static, Postgres>> {
    let assignments = changes.assignments();
    if assignments.is_empty() {
        return None;
    }

    let mut builder = QueryBuilder::new("UPDATE client_info SET ");
    let mut set = builder.separated(", ");
    for (column, value) in assignments {
        set.push(format!("{} = ", column));
        set.push_bind_unseparated(value.to_owned());
    }
    builder.push(" WHERE id = ");
    builder.push_bind(client_id);

    Some(builder)
}

/// Distinct clients matching every supplied filter, ordered by id.
pub fn find_clients(filter: &ClientFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_CLIENTS);

    let conditions = filter.conditions();
    if !conditions.is_empty() {
        builder.push(" WHERE ");
        let mut clause = builder.separated(" AND ");
        for (column, value) in conditions {
            clause.push(format!("{} = ", column));
            clause.push_bind_unseparated(value.to_owned());
        }
    }
    builder.push(" ORDER BY ci.id");

    builder
}
