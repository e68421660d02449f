//! Read access to the fixed `roles` table.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::RoleInfo;

impl Database {
    /// All role rows, ordered by id.
    pub fn list_roles(&self) -> Result<Vec<RoleInfo>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, name, description FROM roles ORDER BY id")?;

        let rows = stmt.query_map([], row_to_role)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Fetch a single role by id.  Used to validate role assignments.
    pub fn get_role(&self, id: i64) -> Result<Option<RoleInfo>> {
        self.conn()
            .query_row(
                "SELECT id, name, description FROM roles WHERE id = ?1",
                params![id],
                row_to_role,
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }
}

fn row_to_role(row: &rusqlite::Row<'_>) -> rusqlite::Result<RoleInfo> {
    Ok(RoleInfo {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_roles_are_readable() {
        let db = Database::open_in_memory().unwrap();

        let admin = db.get_role(1).unwrap().unwrap();
        assert_eq!(admin.name, "admin");

        let user = db.get_role(2).unwrap().unwrap();
        assert_eq!(user.name, "user");

        assert!(db.get_role(42).unwrap().is_none());
    }
}
