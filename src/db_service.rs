use anyhow::Context;

use crate::extract::LocationRecord;

/// Local system of record: two append-only tables in a libsql file.
/// `webhook_data` keeps every payload verbatim for audit, `location_data`
/// keeps the extracted records. Connections are opened per operation.
pub struct DbService {
    db: libsql::Database,
}

impl DbService {
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .context("Failed to open local database")?;

        tracing::debug!("Initialized db at {}", path);

        Ok(DbService { db })
    }

    pub async fn init_tables(&self) -> anyhow::Result<()> {
        let conn = self.db.connect().context("Failed to connect to db")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS webhook_data (id INTEGER PRIMARY KEY AUTOINCREMENT, payload TEXT)",
            libsql::params!(),
        )
        .await
        .context("Failed to create table webhook_data")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS location_data (id INTEGER PRIMARY KEY AUTOINCREMENT, user_id TEXT, trip_id TEXT, timestamp TEXT, latitude REAL, longitude REAL, event_type TEXT)",
            libsql::params!(),
        )
        .await
        .context("Failed to create table location_data")?;

        Ok(())
    }

    /// Appends the unprocessed payload to the raw table. Duplicates are
    /// permitted, rows are never updated or deleted.
    pub async fn insert_raw_event(&self, payload: &serde_json::Value) -> anyhow::Result<()> {
        let payload = serde_json::to_string(payload).context("Failed to serialize raw payload")?;

        let conn = self.db.connect().context("Failed to connect to db")?;
        conn.execute(
            "INSERT INTO webhook_data (payload) VALUES (?)",
            libsql::params!(payload),
        )
        .await
        .context("Failed to insert raw event")?;

        Ok(())
    }

    pub async fn insert_location(&self, record: &LocationRecord) -> anyhow::Result<()> {
        let conn = self.db.connect().context("Failed to connect to db")?;
        conn.execute(
            "INSERT INTO location_data (user_id, trip_id, timestamp, latitude, longitude, event_type) \
             VALUES (?, ?, ?, ?, ?, ?)",
            libsql::params!(
                record.user_id.clone(),
                record.trip_id.clone(),
                record.timestamp.clone(),
                record.latitude,
                record.longitude,
                record.event_type.clone()
            ),
        )
        .await
        .context("Failed to insert location record")?;

        Ok(())
    }

    pub async fn count_raw_events(&self) -> anyhow::Result<i64> {
        self.count_rows("webhook_data").await
    }

    pub async fn count_locations(&self) -> anyhow::Result<i64> {
        self.count_rows("location_data").await
    }

    async fn count_rows(&self, table: &str) -> anyhow::Result<i64> {
        let conn = self.db.connect().context("Failed to connect to db")?;
        let mut rows = conn
            .query(&format!("SELECT COUNT(*) FROM {}", table), libsql::params!())
            .await
            .context("Failed to count rows")?;

        let row = rows
            .next()
            .await?
            .context("Count query returned no rows")?;

        Ok(row.get::<i64>(0)?)
    }

    pub async fn last_location(&self) -> anyhow::Result<Option<LocationRecord>> {
        let conn = self.db.connect().context("Failed to connect to db")?;
        let mut rows = conn
            .query(
                "SELECT user_id, trip_id, timestamp, latitude, longitude, event_type \
                 FROM location_data ORDER BY id DESC LIMIT 1",
                libsql::params!(),
            )
            .await
            .context("Failed to query location_data")?;

        let row = match rows.next().await? {
            Some(row) => row,
            None => return Ok(None),
        };

        Ok(Some(LocationRecord {
            user_id: text_column(&row, 0)?,
            trip_id: text_column(&row, 1)?,
            timestamp: text_column(&row, 2)?,
            latitude: real_column(&row, 3)?,
            longitude: real_column(&row, 4)?,
            event_type: text_column(&row, 5)?,
        }))
    }
}

fn text_column(row: &libsql::Row, idx: i32) -> anyhow::Result<Option<String>> {
    match row.get_value(idx)? {
        libsql::Value::Null => Ok(None),
        libsql::Value::Text(value) => Ok(Some(value)),
        other => Err(anyhow::anyhow!(
            "Expected text in column {} but got {:?}",
            idx,
            other
        )),
    }
}

fn real_column(row: &libsql::Row, idx: i32) -> anyhow::Result<f64> {
    match row.get_value(idx)? {
        libsql::Value::Real(value) => Ok(value),
        libsql::Value::Integer(value) => Ok(value as f64),
        other => Err(anyhow::anyhow!(
            "Expected real in column {} but got {:?}",
            idx,
            other
        )),
    }
}
