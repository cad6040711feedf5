//! Statement builders for each lookup.
//!
//! Table and column names are quoted identifiers from configuration; user and
//! group IDs and key values are always bound parameters.

use groupbridge_domain::{GroupId, KeyFilter, PrimaryGroupConfig, SecondaryGroupConfig, UserId};

use crate::infrastructure::ports::{quote_identifier, Statement};

/// `SELECT <columns> FROM <table> [WHERE <filter> = ? AND ...]`
fn select(columns: &[&str], table: &str, filters: &[(&str, &str)]) -> Statement {
    let mut sql = format!(
        "SELECT {} FROM {}",
        columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", "),
        quote_identifier(table)
    );

    for (i, (column, _)) in filters.iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        sql.push_str(&quote_identifier(column));
        sql.push_str(" = ?");
    }

    filters
        .iter()
        .fold(Statement::new(sql), |statement, (_, value)| statement.bind(*value))
}

fn with_key<'a>(
    mut filters: Vec<(&'a str, &'a str)>,
    key: Option<&'a KeyFilter>,
) -> Vec<(&'a str, &'a str)> {
    if let Some(key) = key {
        filters.push((key.column.as_str(), key.value.as_str()));
    }
    filters
}

pub(super) fn primary_group_by_user(config: &PrimaryGroupConfig, user_id: &UserId) -> Statement {
    select(
        &[config.group_id_column.as_str()],
        config.table.as_str(),
        &with_key(
            vec![(config.user_id_column.as_str(), user_id.as_str())],
            config.key.as_ref(),
        ),
    )
}

pub(super) fn primary_users_by_group(config: &PrimaryGroupConfig, group_id: &GroupId) -> Statement {
    select(
        &[config.user_id_column.as_str()],
        config.table.as_str(),
        &with_key(
            vec![(config.group_id_column.as_str(), group_id.as_str())],
            config.key.as_ref(),
        ),
    )
}

/// The group column for one user: a delimited list or one row per group,
/// depending on the storage method.
pub(super) fn secondary_groups_by_user(
    config: &SecondaryGroupConfig,
    user_id: &UserId,
) -> Statement {
    select(
        &[config.group_id_column.as_str()],
        config.table.as_str(),
        &with_key(
            vec![(config.user_id_column.as_str(), user_id.as_str())],
            config.key.as_ref(),
        ),
    )
}

/// Every (user, delimited groups) row. Membership is decided after
/// splitting, since a `LIKE` match would also hit `12` inside `123`.
pub(super) fn secondary_membership_rows(config: &SecondaryGroupConfig) -> Statement {
    select(
        &[config.user_id_column.as_str(), config.group_id_column.as_str()],
        config.table.as_str(),
        &with_key(Vec::new(), config.key.as_ref()),
    )
}

/// Users holding one group in row-per-membership storage.
pub(super) fn secondary_users_by_group(
    config: &SecondaryGroupConfig,
    group_id: &GroupId,
) -> Statement {
    select(
        &[config.user_id_column.as_str()],
        config.table.as_str(),
        &with_key(
            vec![(config.group_id_column.as_str(), group_id.as_str())],
            config.key.as_ref(),
        ),
    )
}
