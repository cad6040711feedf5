//! MySQL-backed SQL port for the web application's tables.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row as _};
use std::str::FromStr;
use std::time::Duration;

use crate::infrastructure::ports::{QueryError, ResultSet, Row, SqlPort, Statement};
use crate::infrastructure::settings::DatabaseSettings;

/// sqlx pool over the web application's database.
pub struct MySqlSqlPort {
    pool: MySqlPool,
}

impl MySqlSqlPort {
    /// Connect eagerly, failing fast when the database is unreachable.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, QueryError> {
        let options = connect_options(settings)?;
        let pool = pool_options(settings)
            .connect_with(options)
            .await
            .map_err(|e| match QueryError::from(e) {
                QueryError::Endpoint(message) => QueryError::Endpoint(message),
                other => QueryError::driver_instantiation(other),
            })?;

        tracing::info!(
            host = %settings.host,
            database = %settings.name,
            "Connected to web application database"
        );
        Ok(Self { pool })
    }

    /// Build the pool without opening a connection. Connection failures then
    /// surface from the first query.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect_lazy(settings: &DatabaseSettings) -> Result<Self, QueryError> {
        let options = connect_options(settings)?;
        let pool = pool_options(settings).connect_lazy_with(options);

        tracing::info!(
            host = %settings.host,
            database = %settings.name,
            max_connections = settings.max_connections,
            "Configured web application database pool"
        );
        Ok(Self { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn connect_options(settings: &DatabaseSettings) -> Result<MySqlConnectOptions, QueryError> {
    let url = settings.connection_url()?;
    MySqlConnectOptions::from_str(url.as_str()).map_err(QueryError::endpoint)
}

fn pool_options(settings: &DatabaseSettings) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(settings.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
}

#[async_trait]
impl SqlPort for MySqlSqlPort {
    async fn query(&self, statement: &Statement) -> Result<ResultSet, QueryError> {
        tracing::debug!(
            sql = statement.sql(),
            params = statement.params().len(),
            "Executing web group query"
        );

        let mut query = sqlx::query(statement.sql());
        for param in statement.params() {
            query = query.bind(param.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;
        let rows = rows
            .iter()
            .map(to_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ResultSet::new(rows))
    }
}

fn to_row(row: &MySqlRow) -> Result<Row, QueryError> {
    let mut out = Row::new();
    for column in row.columns() {
        out.push(column.name(), column_text(row, column.ordinal())?);
    }
    Ok(out)
}

/// Read any column as text.
///
/// Web applications store IDs as integers or strings depending on the
/// product, and some use binary collations, so each shape is tried in turn.
fn column_text(row: &MySqlRow, index: usize) -> Result<Option<String>, QueryError> {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return Ok(value);
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return Ok(value.map(|v| v.to_string()));
    }
    if let Ok(value) = row.try_get::<Option<u64>, _>(index) {
        return Ok(value.map(|v| v.to_string()));
    }
    row.try_get::<Option<Vec<u8>>, _>(index)
        .map(|value| value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
        .map_err(QueryError::from)
}
