// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::{Error, Result};
use crate::models::{Category, Division, SpendType};

pub fn insert(
    conn: &Connection,
    user_id: i64,
    name: &str,
    division: Division,
    r#type: SpendType,
) -> Result<Category> {
    conn.execute(
        "INSERT INTO categories(user_id, name, division, type) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, name, division.as_str(), r#type.as_str()],
    )?;
    Ok(Category {
        id: conn.last_insert_rowid(),
        user_id,
        name: name.to_string(),
        division,
        r#type,
    })
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, division, type FROM categories WHERE user_id=?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, division, kind) = row?;
        out.push(Category {
            id,
            user_id,
            name,
            division: division
                .parse()
                .map_err(|_| Error::Corrupt(format!("division of category {}", id)))?,
            r#type: kind
                .parse()
                .map_err(|_| Error::Corrupt(format!("type of category {}", id)))?,
        });
    }
    Ok(out)
}

pub fn id_for_name(conn: &Connection, user_id: i64, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM categories WHERE user_id=?1 AND name=?2",
            params![user_id, name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn exists(conn: &Connection, user_id: i64, id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE user_id=?1 AND id=?2",
            params![user_id, id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn delete(conn: &Connection, user_id: i64, name: &str) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM categories WHERE user_id=?1 AND name=?2",
        params![user_id, name],
    )?;
    if changed == 0 {
        return Err(Error::Validation(format!("Category '{}' not found", name)));
    }
    Ok(())
}
