//! Web application group membership lookups.
//!
//! [`WebGroupDao`] answers which groups a web application user belongs to and
//! which users belong to a group. Lookups never fail: any [`QueryError`] is
//! reported once through the [`LogPort`] and the lookup degrades to "no
//! group" / "no members".
//!
//! Two schema strategies exist:
//! - [`SingleWebGroupDao`] for secondary groups joined by a delimiter in one column
//! - [`JunctionWebGroupDao`] for one row per secondary membership
//!
//! Use [`web_group_dao`] to pick the right one from configuration.

mod junction;
mod single;
mod statements;

#[cfg(test)]
mod test_support;

use async_trait::async_trait;
use std::sync::Arc;

use groupbridge_domain::{GroupId, PrimaryGroupConfig, UserId, WebGroupConfig};

use crate::infrastructure::ports::{LogPort, QueryError, ResultSet, Row, SqlPort, Statement};

pub use junction::JunctionWebGroupDao;
pub use single::SingleWebGroupDao;

pub const PRIMARY_GROUP_ERROR: &str = "Exception during WebGroupDao.primary_group_id: ";
pub const SECONDARY_GROUPS_ERROR: &str = "Exception during WebGroupDao.secondary_groups: ";
pub const PRIMARY_USER_IDS_ERROR: &str =
    "Exception during WebGroupDao.group_user_ids_primary: ";
pub const SECONDARY_USER_IDS_ERROR: &str =
    "Exception during WebGroupDao.group_user_ids_secondary: ";

/// Group membership as recorded by the web application.
#[async_trait]
pub trait WebGroupDao: Send + Sync {
    fn queries(&self) -> &GroupQueries;

    /// The user's primary group ID, or an empty string when the feature is
    /// disabled, the user has no row, or the lookup failed.
    async fn primary_group_id(&self, user_id: &UserId) -> String {
        fetch_primary_group_id(self.queries(), user_id, statements::primary_group_by_user).await
    }

    /// The user's secondary groups in stored order.
    async fn secondary_groups(&self, user_id: &UserId) -> Vec<GroupId>;

    /// Users whose primary group is `group_id`, in row order.
    async fn group_user_ids_primary(&self, group_id: &GroupId) -> Vec<UserId>;

    /// Users holding `group_id` as a secondary group.
    async fn group_user_ids_secondary(&self, group_id: &GroupId) -> Vec<UserId>;

    /// Primary members followed by secondary members. Users present in both
    /// appear twice.
    async fn group_user_ids(&self, group_id: &GroupId) -> Vec<UserId> {
        let mut user_ids = self.group_user_ids_primary(group_id).await;
        user_ids.extend(self.group_user_ids_secondary(group_id).await);
        user_ids
    }
}

/// Pick the strategy matching the configured secondary storage method.
pub fn web_group_dao(
    config: Arc<WebGroupConfig>,
    sql: Arc<dyn SqlPort>,
    log: Arc<dyn LogPort>,
) -> Arc<dyn WebGroupDao> {
    let queries = GroupQueries::new(config, sql, log);
    if queries.config().secondary.storage.is_delimited() {
        Arc::new(SingleWebGroupDao::new(queries))
    } else {
        Arc::new(JunctionWebGroupDao::new(queries))
    }
}

// =============================================================================
// Shared query context
// =============================================================================

/// Ports plus the configuration snapshot every strategy queries with.
pub struct GroupQueries {
    config: Arc<WebGroupConfig>,
    sql: Arc<dyn SqlPort>,
    log: Arc<dyn LogPort>,
}

impl GroupQueries {
    pub fn new(config: Arc<WebGroupConfig>, sql: Arc<dyn SqlPort>, log: Arc<dyn LogPort>) -> Self {
        Self { config, sql, log }
    }

    pub fn config(&self) -> &WebGroupConfig {
        &self.config
    }

    pub(crate) async fn fetch(
        &self,
        operation: &'static str,
        statement: Statement,
    ) -> Result<ResultSet, QueryError> {
        tracing::debug!(operation, sql = statement.sql(), "Querying web group tables");
        self.sql.query(&statement).await
    }

    /// Log a failed lookup once and fall back to its empty value.
    pub(crate) fn recover<T: Default>(&self, prefix: &str, result: Result<T, QueryError>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(
                    kind = error.kind(),
                    error = %error,
                    "{}",
                    prefix.trim_end_matches(": ")
                );
                self.log.severe(&format!("{}{}", prefix, error));
                T::default()
            }
        }
    }
}

/// Look up a primary group using `build` to shape the statement.
///
/// Returns an empty string when the primary feature is disabled (without
/// querying), when no row matches, or when the stored value is NULL.
pub async fn fetch_primary_group_id<F>(
    queries: &GroupQueries,
    user_id: &UserId,
    build: F,
) -> String
where
    F: FnOnce(&PrimaryGroupConfig, &UserId) -> Statement + Send,
{
    let config = &queries.config().primary;
    if !config.enabled {
        return String::new();
    }

    let result = load_primary_group_id(queries, config, build(config, user_id)).await;
    queries.recover(PRIMARY_GROUP_ERROR, result)
}

async fn load_primary_group_id(
    queries: &GroupQueries,
    config: &PrimaryGroupConfig,
    statement: Statement,
) -> Result<String, QueryError> {
    let mut rows = queries.fetch("primary_group_id", statement).await?;
    match rows.next() {
        Some(row) => Ok(text(&row, &config.group_id_column)?.unwrap_or_default()),
        None => Ok(String::new()),
    }
}

/// Users whose primary group is `group_id`. Shared by every strategy since
/// primary groups always live one-per-row.
pub async fn fetch_primary_user_ids(queries: &GroupQueries, group_id: &GroupId) -> Vec<UserId> {
    let config = &queries.config().primary;
    if !config.enabled {
        return Vec::new();
    }

    let result = load_primary_user_ids(queries, config, group_id).await;
    queries.recover(PRIMARY_USER_IDS_ERROR, result)
}

async fn load_primary_user_ids(
    queries: &GroupQueries,
    config: &PrimaryGroupConfig,
    group_id: &GroupId,
) -> Result<Vec<UserId>, QueryError> {
    let rows = queries
        .fetch(
            "group_user_ids_primary",
            statements::primary_users_by_group(config, group_id),
        )
        .await?;
    collect_user_ids(rows, &config.user_id_column)
}

// =============================================================================
// Row helpers
// =============================================================================

fn text(row: &Row, column: &str) -> Result<Option<String>, QueryError> {
    Ok(row.get(column)?.map(str::to_string))
}

/// One user per row; NULL user IDs are skipped. Duplicates are kept.
fn collect_user_ids(rows: ResultSet, column: &str) -> Result<Vec<UserId>, QueryError> {
    collect_user_ids_where(rows, column, |_| Ok(true))
}

/// Like [`collect_user_ids`], for rows accepted by `keep`.
fn collect_user_ids_where<F>(
    rows: ResultSet,
    column: &str,
    mut keep: F,
) -> Result<Vec<UserId>, QueryError>
where
    F: FnMut(&Row) -> Result<bool, QueryError>,
{
    let mut user_ids = Vec::new();
    for row in rows {
        if !keep(&row)? {
            continue;
        }
        if let Some(user_id) = text(&row, column)? {
            user_ids.push(UserId::from(user_id));
        }
    }
    Ok(user_ids)
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::infrastructure::ports::{MockLogPort, MockSqlPort};
    use groupbridge_domain::{KeyFilter, SecondaryStorage};
    use mockall::Sequence;

    #[tokio::test]
    async fn primary_group_id_returns_group_column() {
        let mut sql = MockSqlPort::new();
        sql.expect_query()
            .withf(|statement| {
                statement.sql()
                    == "SELECT `primaryGroupIDs` FROM `primary_table` WHERE `primaryUserID` = ?"
                    && statement.params() == [USER_ID]
            })
            .times(1)
            .returning(|_| Ok(rows(vec![Row::new().with_value(PRIMARY_GROUP_COLUMN, "7")])));

        let dao = dao(config(), sql, MockLogPort::new());

        assert_eq!(dao.primary_group_id(&UserId::from(USER_ID)).await, "7");
    }

    #[tokio::test]
    async fn primary_group_id_scopes_by_key_column() {
        let mut config = config();
        config.primary.key = Some(KeyFilter::new("meta_key", "group"));

        let mut sql = MockSqlPort::new();
        sql.expect_query()
            .withf(|statement| {
                statement.sql()
                    == "SELECT `primaryGroupIDs` FROM `primary_table` \
                        WHERE `primaryUserID` = ? AND `meta_key` = ?"
                    && statement.params() == [USER_ID, "group"]
            })
            .times(1)
            .returning(|_| Ok(rows(vec![Row::new().with_value(PRIMARY_GROUP_COLUMN, "3")])));

        let dao = dao(config, sql, MockLogPort::new());

        assert_eq!(dao.primary_group_id(&UserId::from(USER_ID)).await, "3");
    }

    #[tokio::test]
    async fn primary_group_id_with_no_rows_is_empty() {
        let mut sql = MockSqlPort::new();
        sql.expect_query().returning(|_| Ok(ResultSet::empty()));

        let dao = dao(config(), sql, MockLogPort::new());

        assert_eq!(dao.primary_group_id(&UserId::from(USER_ID)).await, "");
    }

    #[tokio::test]
    async fn primary_group_id_with_null_value_is_empty() {
        let mut sql = MockSqlPort::new();
        sql.expect_query()
            .returning(|_| Ok(rows(vec![Row::new().with_null(PRIMARY_GROUP_COLUMN)])));

        let dao = dao(config(), sql, MockLogPort::new());

        assert_eq!(dao.primary_group_id(&UserId::from(USER_ID)).await, "");
    }

    #[tokio::test]
    async fn primary_group_id_when_disabled_does_not_query() {
        let mut config = config();
        config.primary.enabled = false;

        let dao = dao(config, MockSqlPort::new(), MockLogPort::new());

        assert_eq!(dao.primary_group_id(&UserId::from(USER_ID)).await, "");
    }

    #[tokio::test]
    async fn primary_group_id_handles_every_failure_kind() {
        for failure in failures() {
            let log = expect_one_severe(PRIMARY_GROUP_ERROR);
            let dao = dao(config(), failing_sql(failure), log);

            assert_eq!(dao.primary_group_id(&UserId::from(USER_ID)).await, "");
        }
    }

    #[tokio::test]
    async fn primary_group_id_missing_column_is_logged() {
        let mut sql = MockSqlPort::new();
        sql.expect_query()
            .returning(|_| Ok(rows(vec![Row::new().with_value("unexpected", "7")])));

        let mut log = MockLogPort::new();
        log.expect_severe()
            .withf(|message: &str| message.starts_with(PRIMARY_GROUP_ERROR))
            .times(1)
            .return_const(());

        let dao = dao(config(), sql, log);

        assert_eq!(dao.primary_group_id(&UserId::from(USER_ID)).await, "");
    }

    #[tokio::test]
    async fn fetch_primary_group_id_uses_supplied_builder() {
        let mut sql = MockSqlPort::new();
        sql.expect_query()
            .withf(|statement| statement.sql() == "SELECT custom" && statement.params() == [USER_ID])
            .times(1)
            .returning(|_| Ok(rows(vec![Row::new().with_value(PRIMARY_GROUP_COLUMN, "9")])));

        let queries = GroupQueries::new(
            Arc::new(config()),
            Arc::new(sql),
            Arc::new(MockLogPort::new()),
        );

        let group = fetch_primary_group_id(&queries, &UserId::from(USER_ID), |_, user_id| {
            Statement::new("SELECT custom").bind(user_id.as_str())
        })
        .await;

        assert_eq!(group, "9");
    }

    #[tokio::test]
    async fn group_user_ids_concatenates_primary_then_secondary() {
        let mut seq = Sequence::new();
        let mut sql = MockSqlPort::new();
        sql.expect_query()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(rows(vec![
                    Row::new().with_value(PRIMARY_USER_COLUMN, "p1"),
                    Row::new().with_value(PRIMARY_USER_COLUMN, "p2"),
                ]))
            });
        sql.expect_query()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(rows(vec![
                    secondary_row("s1", "10,20"),
                    secondary_row("p1", "20"),
                    secondary_row("s3", "30"),
                ]))
            });

        let dao = dao(config(), sql, MockLogPort::new());

        let members = dao.group_user_ids(&GroupId::from("20")).await;
        assert_eq!(members, user_ids(&["p1", "p2", "s1", "p1"]));
    }

    #[tokio::test]
    async fn group_user_ids_keeps_secondary_when_primary_fails() {
        let mut seq = Sequence::new();
        let mut sql = MockSqlPort::new();
        sql.expect_query()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(QueryError::execution(TEST_MESSAGE)));
        sql.expect_query()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(rows(vec![secondary_row("s1", "20")])));

        let log = expect_one_severe(PRIMARY_USER_IDS_ERROR);
        let dao = dao(config(), sql, log);

        let members = dao.group_user_ids(&GroupId::from("20")).await;
        assert_eq!(members, user_ids(&["s1"]));
    }

    #[tokio::test]
    async fn group_user_ids_with_everything_disabled_is_empty() {
        let mut config = config();
        config.primary.enabled = false;
        config.secondary.enabled = false;

        let dao = dao(config, MockSqlPort::new(), MockLogPort::new());

        assert!(dao.group_user_ids(&GroupId::from("20")).await.is_empty());
    }

    #[tokio::test]
    async fn factory_picks_strategy_from_storage_method() {
        let stored = || -> Result<ResultSet, QueryError> {
            Ok(rows(vec![
                Row::new().with_value(SECONDARY_GROUP_COLUMN, "1, 2"),
                Row::new().with_value(SECONDARY_GROUP_COLUMN, "3"),
            ]))
        };

        let mut delimited = config();
        delimited.secondary.storage = SecondaryStorage::Single;
        let mut sql = MockSqlPort::new();
        sql.expect_query().returning(move |_| stored());
        let delimited_dao = dao(delimited, sql, MockLogPort::new());
        assert_eq!(
            delimited_dao.secondary_groups(&UserId::from(USER_ID)).await,
            group_ids(&["1", "2"])
        );

        let mut junction = config();
        junction.secondary.storage = SecondaryStorage::Junction;
        let mut sql = MockSqlPort::new();
        sql.expect_query().returning(move |_| stored());
        let junction_dao = dao(junction, sql, MockLogPort::new());
        assert_eq!(
            junction_dao.secondary_groups(&UserId::from(USER_ID)).await,
            group_ids(&["1, 2", "3"])
        );
    }
}
