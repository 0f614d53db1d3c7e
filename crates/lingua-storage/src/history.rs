//! Translation history: every completed translation lands here, newest
//! first, with keyset pagination for infinite scrolling.

use std::path::Path;

use anyhow::{Context, Result};
use lingua_observability::Span;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
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
        CREATE TABLE IF NOT EXISTS history (
          id TEXT PRIMARY KEY,
          created_at_ms INTEGER NOT NULL,
          input_lang TEXT NOT NULL,
          output_lang TEXT NOT NULL,
          input_text TEXT NOT NULL,
          output_text TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_history_created_at ON history(created_at_ms DESC);
        "#,
    )
    .context("init sqlite schema failed")?;
    Ok(c)
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryItem> {
    Ok(HistoryItem {
        id: row.get(0)?,
        created_at_ms: row.get(1)?,
        input_lang: row.get(2)?,
        output_lang: row.get(3)?,
        input_text: row.get(4)?,
        output_text: row.get(5)?,
    })
}

pub fn append(db_path: &Path, item: &HistoryItem) -> Result<()> {
    let data_dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let span = Span::start(
        data_dir,
        Some(item.id.as_str()),
        "History",
        "HISTORY.append",
        Some(serde_json::json!({
            "input_lang": item.input_lang,
            "output_lang": item.output_lang,
            "input_chars": item.input_text.len(),
            "output_chars": item.output_text.len(),
        })),
    );

    let c = match conn(db_path) {
        Ok(c) => c,
        Err(e) => {
            span.err("db", "E_HISTORY_CONN", &e.to_string(), None);
            return Err(e);
        }
    };
    let r = c.execute(
        r#"
        INSERT OR REPLACE INTO history
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
            Ok(())
        }
        Err(e) => {
            span.err("db", "E_HISTORY_INSERT", &format!("{e}"), None);
            Err(anyhow::anyhow!(e).context("insert history failed"))
        }
    }
}

pub fn list(db_path: &Path, limit: i64, before_ms: Option<i64>) -> Result<Vec<HistoryItem>> {
    let data_dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let span = Span::start(
        data_dir,
        None,
        "History",
        "HISTORY.list",
        Some(serde_json::json!({"limit": limit, "before_ms": before_ms})),
    );

    let c = match conn(db_path) {
        Ok(c) => c,
        Err(e) => {
            span.err("db", "E_HISTORY_CONN", &e.to_string(), None);
            return Err(e);
        }
    };
    let mut out = Vec::new();
    match before_ms {
        Some(ms) => {
            let mut stmt = c
                .prepare(
                    r#"
                    SELECT id, created_at_ms, input_lang, output_lang, input_text, output_text
                    FROM history
                    WHERE created_at_ms < ?1
                    ORDER BY created_at_ms DESC
                    LIMIT ?2
                    "#,
                )
                .context("prepare history list failed")?;
            let rows = stmt
                .query_map(params![ms, limit], row_to_item)
                .context("query history list failed")?;
            for r in rows {
                out.push(r?);
            }
        }
        None => {
            let mut stmt = c
                .prepare(
                    r#"
                    SELECT id, created_at_ms, input_lang, output_lang, input_text, output_text
                    FROM history
                    ORDER BY created_at_ms DESC
                    LIMIT ?1
                    "#,
                )
                .context("prepare history list failed")?;
            let rows = stmt
                .query_map(params![limit], row_to_item)
                .context("query history list failed")?;
            for r in rows {
                out.push(r?);
            }
        }
    }
    span.ok(Some(serde_json::json!({"items": out.len()})));
    Ok(out)
}

pub fn clear(db_path: &Path) -> Result<()> {
    let data_dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let span = Span::start(data_dir, None, "History", "HISTORY.clear", None);
    let c = match conn(db_path) {
        Ok(c) => c,
        Err(e) => {
            span.err("db", "E_HISTORY_CONN", &e.to_string(), None);
            return Err(e);
        }
    };
    match c.execute("DELETE FROM history", []) {
        Ok(_) => {
            span.ok(None);
            Ok(())
        }
        Err(e) => {
            span.err("db", "E_HISTORY_CLEAR", &format!("{e}"), None);
            Err(anyhow::anyhow!(e).context("clear history failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, ts: i64) -> HistoryItem {
        HistoryItem {
            id: id.to_string(),
            created_at_ms: ts,
            input_lang: "en".to_string(),
            output_lang: "fr".to_string(),
            input_text: "hello".to_string(),
            output_text: "bonjour".to_string(),
        }
    }

    #[test]
    fn append_list_round_trip_newest_first() {
        let td = tempfile::tempdir().expect("tempdir");
        let db = td.path().join("history.sqlite3");
        append(&db, &item("a", 100)).expect("append");
        append(&db, &item("b", 300)).expect("append");
        append(&db, &item("c", 200)).expect("append");

        let all = list(&db, 10, None).expect("list");
        let ids: Vec<&str> = all.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn before_ms_pages_strictly_older_rows() {
        let td = tempfile::tempdir().expect("tempdir");
        let db = td.path().join("history.sqlite3");
        for (id, ts) in [("a", 100), ("b", 200), ("c", 300)] {
            append(&db, &item(id, ts)).expect("append");
        }
        let page = list(&db, 10, Some(300)).expect("list");
        let ids: Vec<&str> = page.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn clear_empties_the_table() {
        let td = tempfile::tempdir().expect("tempdir");
        let db = td.path().join("history.sqlite3");
        append(&db, &item("a", 100)).expect("append");
        clear(&db).expect("clear");
        assert!(list(&db, 10, None).expect("list").is_empty());
    }

    #[test]
    fn same_id_replaces_instead_of_duplicating() {
        let td = tempfile::tempdir().expect("tempdir");
        let db = td.path().join("history.sqlite3");
        append(&db, &item("a", 100)).expect("append");
        let mut updated = item("a", 100);
        updated.output_text = "salut".to_string();
        append(&db, &updated).expect("append");
        let all = list(&db, 10, None).expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].output_text, "salut");
    }
}
