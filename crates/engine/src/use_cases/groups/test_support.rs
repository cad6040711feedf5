//! Shared fixtures for group lookup tests.

use std::sync::Arc;

use groupbridge_domain::{
    GroupId, PrimaryGroupConfig, SecondaryGroupConfig, SecondaryStorage, UserId, WebGroupConfig,
};

use super::{web_group_dao, WebGroupDao};
use crate::infrastructure::ports::{MockLogPort, MockSqlPort, QueryError, ResultSet, Row};

pub const TEST_MESSAGE: &str = "test message";
pub const USER_ID: &str = "42";

pub const PRIMARY_USER_COLUMN: &str = "primaryUserID";
pub const PRIMARY_GROUP_COLUMN: &str = "primaryGroupIDs";
pub const SECONDARY_USER_COLUMN: &str = "secondaryUserID";
pub const SECONDARY_GROUP_COLUMN: &str = "secondaryGroupIDs";

/// Both features enabled, delimited secondary storage, no key columns.
pub fn config() -> WebGroupConfig {
    WebGroupConfig::new(
        PrimaryGroupConfig {
            enabled: true,
            table: "primary_table".into(),
            user_id_column: PRIMARY_USER_COLUMN.into(),
            group_id_column: PRIMARY_GROUP_COLUMN.into(),
            key: None,
        },
        SecondaryGroupConfig {
            enabled: true,
            table: "secondary_table".into(),
            user_id_column: SECONDARY_USER_COLUMN.into(),
            group_id_column: SECONDARY_GROUP_COLUMN.into(),
            key: None,
            delimiter: ",".into(),
            storage: SecondaryStorage::Single,
        },
    )
}

pub fn dao(config: WebGroupConfig, sql: MockSqlPort, log: MockLogPort) -> Arc<dyn WebGroupDao> {
    web_group_dao(Arc::new(config), Arc::new(sql), Arc::new(log))
}

pub fn rows(rows: Vec<Row>) -> ResultSet {
    ResultSet::new(rows)
}

pub fn secondary_row(user_id: &str, groups: &str) -> Row {
    Row::new()
        .with_value(SECONDARY_USER_COLUMN, user_id)
        .with_value(SECONDARY_GROUP_COLUMN, groups)
}

pub fn user_ids(ids: &[&str]) -> Vec<UserId> {
    ids.iter().map(|id| UserId::from(*id)).collect()
}

pub fn group_ids(ids: &[&str]) -> Vec<GroupId> {
    ids.iter().map(|id| GroupId::from(*id)).collect()
}

/// One of each failure kind a SQL port can raise.
pub fn failures() -> Vec<QueryError> {
    vec![
        QueryError::execution(TEST_MESSAGE),
        QueryError::endpoint(TEST_MESSAGE),
        QueryError::driver_instantiation(TEST_MESSAGE),
        QueryError::driver_access(TEST_MESSAGE),
    ]
}

pub fn failing_sql(failure: QueryError) -> MockSqlPort {
    let mut sql = MockSqlPort::new();
    sql.expect_query()
        .times(1)
        .returning(move |_| Err(failure.clone()));
    sql
}

/// A log expecting exactly one severe message: `prefix` + the test failure.
pub fn expect_one_severe(prefix: &'static str) -> MockLogPort {
    let expected = format!("{}{}", prefix, TEST_MESSAGE);
    let mut log = MockLogPort::new();
    log.expect_severe()
        .withf(move |message: &str| message == expected)
        .times(1)
        .return_const(());
    log
}
