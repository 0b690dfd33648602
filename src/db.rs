use crate::errors::{ServiceError, ServiceResult};
use crate::sec::types::Company;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub type DbPool = Arc<Mutex<Connection>>;

pub fn init_db(data_dir: &Path) -> ServiceResult<DbPool> {
    std::fs::create_dir_all(data_dir).map_err(|e| ServiceError::Database(format!("create dir: {e}")))?;
    let db_path = data_dir.join("stockdesk.db");
    let conn = Connection::open(&db_path)?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    let pool = init_schema(conn)?;

    tracing::info!("database initialized at {}", db_path.display());
    Ok(pool)
}

/// Apply migrations to an open connection and wrap it for sharing.
pub fn init_schema(conn: Connection) -> ServiceResult<DbPool> {
    let schema = include_str!("../migrations/001_init.sql");
    conn.execute_batch(schema)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Swap the whole ticker directory in one transaction.
/// Readers see either the old directory or the new one, never a mix.
/// On duplicate tickers the first entry wins.
pub fn replace_companies(db: &DbPool, companies: &[Company], refreshed_at: &str) -> ServiceResult<usize> {
    let mut conn = db.lock().map_err(|e| ServiceError::Database(format!("lock poisoned: {e}")))?;
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM companies", [])?;
    let mut stored = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO companies (ticker, cik, title, refreshed_at) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for c in companies {
            stored += stmt.execute(rusqlite::params![c.ticker.to_uppercase(), c.cik_str as i64, c.title, refreshed_at])?;
        }
    }
    tx.commit()?;

    Ok(stored)
}

pub fn find_company(db: &DbPool, ticker: &str) -> ServiceResult<Option<Company>> {
    let conn = db.lock().map_err(|e| ServiceError::Database(format!("lock: {e}")))?;
    let company = conn
        .query_row(
            "SELECT ticker, cik, title FROM companies WHERE ticker = ?1",
            rusqlite::params![ticker.to_uppercase()],
            |row| {
                Ok(Company {
                    ticker: row.get(0)?,
                    cik_str: row.get::<_, i64>(1)? as u64,
                    title: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(company)
}

pub fn company_count(db: &DbPool) -> ServiceResult<usize> {
    let conn = db.lock().map_err(|e| ServiceError::Database(format!("lock: {e}")))?;
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;
    Ok(n as usize)
}

/// Timestamp of the last successful directory refresh, if any.
pub fn last_refreshed_at(db: &DbPool) -> ServiceResult<Option<String>> {
    let conn = db.lock().map_err(|e| ServiceError::Database(format!("lock: {e}")))?;
    let ts: Option<String> = conn.query_row("SELECT MAX(refreshed_at) FROM companies", [], |row| row.get(0))?;
    Ok(ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> DbPool {
        init_schema(Connection::open_in_memory().expect("open")).expect("schema")
    }

    fn company(ticker: &str, cik: u64, title: &str) -> Company {
        Company {
            cik_str: cik,
            ticker: ticker.into(),
            title: title.into(),
        }
    }

    #[test]
    fn test_empty_directory() {
        let db = memory_db();
        assert_eq!(company_count(&db).expect("count"), 0);
        assert_eq!(find_company(&db, "AAPL").expect("find"), None);
        assert_eq!(last_refreshed_at(&db).expect("ts"), None);
    }

    #[test]
    fn test_replace_and_lookup_case_insensitive() {
        let db = memory_db();
        let n = replace_companies(
            &db,
            &[company("AAPL", 320193, "Apple Inc."), company("msft", 789019, "MICROSOFT CORP")],
            "2026-10-19T00:00:00Z",
        )
        .expect("replace");
        assert_eq!(n, 2);
        assert_eq!(company_count(&db).expect("count"), 2);

        let apple = find_company(&db, "aapl").expect("find").expect("present");
        assert_eq!(apple.cik_str, 320193);
        assert_eq!(apple.title, "Apple Inc.");

        let msft = find_company(&db, "MSFT").expect("find").expect("present");
        assert_eq!(msft.ticker, "MSFT");
        assert_eq!(last_refreshed_at(&db).expect("ts").as_deref(), Some("2026-10-19T00:00:00Z"));
    }

    #[test]
    fn test_duplicate_ticker_keeps_first() {
        let db = memory_db();
        replace_companies(&db, &[company("DUP", 10, "First"), company("dup", 20, "Second")], "t")
            .expect("replace");
        let dup = find_company(&db, "DUP").expect("find").expect("present");
        assert_eq!(dup.cik_str, 10);
        assert_eq!(company_count(&db).expect("count"), 1);
    }

    #[test]
    fn test_replace_drops_delisted_tickers() {
        let db = memory_db();
        replace_companies(&db, &[company("OLD", 1, "Old Co")], "t1").expect("first");
        replace_companies(&db, &[company("NEW", 2, "New Co")], "t2").expect("second");

        assert_eq!(find_company(&db, "OLD").expect("find"), None);
        assert!(find_company(&db, "NEW").expect("find").is_some());
        assert_eq!(company_count(&db).expect("count"), 1);
    }
}
