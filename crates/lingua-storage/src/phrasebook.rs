//! Phrasebook: user-starred translations. Starring inserts a row and hands
//! back the membership id the UI stamps onto the output; unstarring deletes
//! by that id.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use lingua_observability::Span;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhrasebookItem {
    pub id: String,
    pub created_at_ms: i64,
    pub input_lang: String,
    pub output_lang: String,
    pub input_text: String,
    pub output_text: String,
}

fn conn(db_path: &Path) -> Result<Connection> {
    let c = Connection::open(db_path).context("open sqlite failed")?;
    c.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS phrasebook (
          id TEXT PRIMARY KEY,
          created_at_ms INTEGER NOT NULL,
          input_lang TEXT NOT NULL,
          output_lang TEXT NOT NULL,
          input_text TEXT NOT NULL,
          output_text TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_phrasebook_created_at ON phrasebook(created_at_ms DESC);
        "#,
    )
    .context("init sqlite schema failed")?;
    Ok(c)
}

/// Star a translation. A blank id is filled with a fresh uuid; the stored
/// item (with its id) comes back for the caller to stamp onto the output.
pub fn add(db_path: &Path, mut item: PhrasebookItem) -> Result<PhrasebookItem> {
    if item.output_text.trim().is_empty() {
        return Err(anyhow!("phrasebook entry needs output text"));
    }
    if item.id.trim().is_empty() {
        item.id = Uuid::new_v4().to_string();
    }

    let data_dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let span = Span::start(
        data_dir,
        Some(item.id.as_str()),
        "Phrasebook",
        "PHRASEBOOK.add",
        Some(serde_json::json!({
            "input_lang": item.input_lang,
            "output_lang": item.output_lang,
        })),
    );

    let c = match conn(db_path) {
        Ok(c) => c,
        Err(e) => {
            span.err("db", "E_PHRASEBOOK_CONN", &e.to_string(), None);
            return Err(e);
        }
    };
    let r = c.execute(
        r#"
        INSERT OR REPLACE INTO phrasebook
        (id, created_at_ms, input_lang, output_lang, input_text, output_text)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            item.id,
            item.created_at_ms,
            item.input_lang,
            item.output_lang,
            item.input_text,
            item.output_text,
        ],
    );
    match r {
        Ok(_) => {
            span.ok(None);
            Ok(item)
        }
        Err(e) => {
            span.err("db", "E_PHRASEBOOK_INSERT", &format!("{e}"), None);
            Err(anyhow::anyhow!(e).context("insert phrasebook failed"))
        }
    }
}

/// Unstar by membership id. Removing an id that is already gone is not an
/// error; the toggle must stay fire-and-forget.
pub fn remove(db_path: &Path, id: &str) -> Result<()> {
    let data_dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let span = Span::start(
        data_dir,
        Some(id),
        "Phrasebook",
        "PHRASEBOOK.remove",
        None,
    );
    let c = match conn(db_path) {
        Ok(c) => c,
        Err(e) => {
            span.err("db", "E_PHRASEBOOK_CONN", &e.to_string(), None);
            return Err(e);
        }
    };
    match c.execute("DELETE FROM phrasebook WHERE id = ?1", params![id]) {
        Ok(n) => {
            span.ok(Some(serde_json::json!({"deleted": n})));
            Ok(())
        }
        Err(e) => {
            span.err("db", "E_PHRASEBOOK_DELETE", &format!("{e}"), None);
            Err(anyhow::anyhow!(e).context("delete phrasebook failed"))
        }
    }
}

pub fn list(db_path: &Path, limit: i64, before_ms: Option<i64>) -> Result<Vec<PhrasebookItem>> {
    let data_dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let span = Span::start(
        data_dir,
        None,
        "Phrasebook",
        "PHRASEBOOK.list",
        Some(serde_json::json!({"limit": limit, "before_ms": before_ms})),
    );

    let c = match conn(db_path) {
        Ok(c) => c,
        Err(e) => {
            span.err("db", "E_PHRASEBOOK_CONN", &e.to_string(), None);
            return Err(e);
        }
    };

    let (sql, args) = match before_ms {
        Some(ms) => (
            r#"
            SELECT id, created_at_ms, input_lang, output_lang, input_text, output_text
            FROM phrasebook
            WHERE created_at_ms < ?1
            ORDER BY created_at_ms DESC
            LIMIT ?2
            "#,
            vec![ms, limit],
        ),
        None => (
            r#"
            SELECT id, created_at_ms, input_lang, output_lang, input_text, output_text
            FROM phrasebook
            ORDER BY created_at_ms DESC
            LIMIT ?1
            "#,
            vec![limit],
        ),
    };
    let mut stmt = c.prepare(sql).context("prepare phrasebook list failed")?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(args), |row| {
            Ok(PhrasebookItem {
                id: row.get(0)?,
                created_at_ms: row.get(1)?,
                input_lang: row.get(2)?,
                output_lang: row.get(3)?,
                input_text: row.get(4)?,
                output_text: row.get(5)?,
            })
        })
        .context("query phrasebook list failed")?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    span.ok(Some(serde_json::json!({"items": out.len()})));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(ts: i64) -> PhrasebookItem {
        PhrasebookItem {
            id: String::new(),
            created_at_ms: ts,
            input_lang: "en".to_string(),
            output_lang: "ja".to_string(),
            input_text: "cat".to_string(),
            output_text: "猫".to_string(),
        }
    }

    #[test]
    fn add_assigns_an_id_and_round_trips() {
        let td = tempfile::tempdir().expect("tempdir");
        let db = td.path().join("phrasebook.sqlite3");
        let stored = add(&db, item(100)).expect("add");
        assert!(!stored.id.is_empty());

        let all = list(&db, 10, None).expect("list");
        assert_eq!(all, vec![stored]);
    }

    #[test]
    fn remove_deletes_by_membership_id() {
        let td = tempfile::tempdir().expect("tempdir");
        let db = td.path().join("phrasebook.sqlite3");
        let stored = add(&db, item(100)).expect("add");
        remove(&db, &stored.id).expect("remove");
        assert!(list(&db, 10, None).expect("list").is_empty());
        // Toggling off twice stays quiet.
        remove(&db, &stored.id).expect("remove again");
    }

    #[test]
    fn empty_output_text_is_rejected() {
        let td = tempfile::tempdir().expect("tempdir");
        let db = td.path().join("phrasebook.sqlite3");
        let mut bad = item(100);
        bad.output_text = "  ".to_string();
        assert!(add(&db, bad).is_err());
    }

    #[test]
    fn list_is_newest_first() {
        let td = tempfile::tempdir().expect("tempdir");
        let db = td.path().join("phrasebook.sqlite3");
        add(&db, item(100)).expect("add");
        add(&db, item(300)).expect("add");
        add(&db, item(200)).expect("add");
        let ts: Vec<i64> = list(&db, 10, None)
            .expect("list")
            .iter()
            .map(|i| i.created_at_ms)
            .collect();
        assert_eq!(ts, vec![300, 200, 100]);
    }
}
