//! SQLite-backed named cache.
//!
//! Every write re-opens its cache container by name (insert-or-ignore) inside
//! the same database call, so a cache exists from the first time it is written
//! and is never dropped by these operations. Reads only query `entries`: a
//! container that was never written holds no rows, and reads stay off the
//! write lock.

use async_trait::async_trait;
use tokio_rusqlite::{params, rusqlite};

use super::connection::CacheDb;
use super::{Body, ContentStore, DeleteOptions, Headers, RequestIdentity, StoredResponse};
use crate::Error;

/// One named cache inside a [`CacheDb`].
#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: CacheDb,
    name: String,
}

fn open_container(conn: &rusqlite::Connection, name: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

impl SqliteStore {
    pub(crate) fn new(db: CacheDb, name: String) -> Self {
        Self { db, name }
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, identity: &RequestIdentity) -> Result<Option<StoredResponse>, Error> {
        let name = self.name.clone();
        let identity = identity.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let row = conn.query_row(
                    "SELECT headers_json, body_kind, body FROM entries
                     WHERE cache_name = ?1 AND method = ?2 AND url = ?3",
                    params![name, identity.method, identity.url],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?)),
                );

                let (headers_json, body_kind, body) = match row {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let headers: Headers = serde_json::from_str(&headers_json)
                    .map_err(|e| Error::CorruptEntry(format!("headers for {identity}: {e}")))?;
                let body = Body::from_stored(&body_kind, body)?;

                Ok(Some(StoredResponse { headers, body }))
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, identity: &RequestIdentity, response: &StoredResponse) -> Result<(), Error> {
        let name = self.name.clone();
        let identity = identity.clone();
        let normalized_url = identity.normalized_url();
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("failed to serialize headers: {e}")))?;
        let body_kind = response.body.kind();
        let body = response.body.as_bytes().to_vec();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                open_container(conn, &name)?;
                conn.execute(
                    "INSERT INTO entries (
                        cache_name, method, url, normalized_url, headers_json, body_kind, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(cache_name, method, url) DO UPDATE SET
                        normalized_url = excluded.normalized_url,
                        headers_json = excluded.headers_json,
                        body_kind = excluded.body_kind,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        name,
                        identity.method,
                        identity.url,
                        normalized_url,
                        headers_json,
                        body_kind,
                        body,
                        chrono::Utc::now().to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, identity: &RequestIdentity, options: DeleteOptions) -> Result<u64, Error> {
        let name = self.name.clone();
        let identity = identity.clone();
        let (url_column, url_value) = if options.ignore_search {
            ("normalized_url", identity.normalized_url())
        } else {
            ("url", identity.url.clone())
        };

        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                open_container(conn, &name)?;
                let count = if options.ignore_method {
                    conn.execute(
                        &format!("DELETE FROM entries WHERE cache_name = ?1 AND {url_column} = ?2"),
                        params![name, url_value],
                    )?
                } else {
                    conn.execute(
                        &format!("DELETE FROM entries WHERE cache_name = ?1 AND {url_column} = ?2 AND method = ?3"),
                        params![name, url_value, identity.method],
                    )?
                };
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    async fn clear(&self) -> Result<u64, Error> {
        let name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                open_container(conn, &name)?;
                let count = conn.execute("DELETE FROM entries WHERE cache_name = ?1", params![name])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<RequestIdentity>, Error> {
        let name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<RequestIdentity>, Error> {
                let mut stmt = conn.prepare("SELECT method, url FROM entries WHERE cache_name = ?1 ORDER BY rowid")?;
                let keys = stmt
                    .query_map(params![name], |row| {
                        Ok(RequestIdentity { method: row.get(0)?, url: row.get(1)? })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}
