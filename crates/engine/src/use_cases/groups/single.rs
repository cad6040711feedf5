//! Delimited secondary groups.
//!
//! Covers the `single` and `key-value` storage methods: each user has one
//! row (scoped by the key column when configured) whose group column holds
//! every secondary group joined by the delimiter, e.g. `"4,12,15"`.

use async_trait::async_trait;

use groupbridge_domain::{split_group_ids, GroupId, SecondaryGroupConfig, UserId};

use crate::infrastructure::ports::QueryError;

use super::{
    collect_user_ids_where, fetch_primary_user_ids, statements, text, GroupQueries, WebGroupDao,
    SECONDARY_GROUPS_ERROR, SECONDARY_USER_IDS_ERROR,
};

pub struct SingleWebGroupDao {
    queries: GroupQueries,
}

impl SingleWebGroupDao {
    pub fn new(queries: GroupQueries) -> Self {
        Self { queries }
    }

    async fn load_secondary_groups(
        &self,
        config: &SecondaryGroupConfig,
        user_id: &UserId,
    ) -> Result<Vec<GroupId>, QueryError> {
        let mut rows = self
            .queries
            .fetch(
                "secondary_groups",
                statements::secondary_groups_by_user(config, user_id),
            )
            .await?;

        let Some(row) = rows.next() else {
            return Ok(Vec::new());
        };
        Ok(text(&row, &config.group_id_column)?
            .map(|groups| split_group_ids(&groups, &config.delimiter))
            .unwrap_or_default())
    }

    async fn load_secondary_members(
        &self,
        config: &SecondaryGroupConfig,
        group_id: &GroupId,
    ) -> Result<Vec<UserId>, QueryError> {
        let rows = self
            .queries
            .fetch(
                "group_user_ids_secondary",
                statements::secondary_membership_rows(config),
            )
            .await?;

        collect_user_ids_where(rows, &config.user_id_column, |row| {
            Ok(text(row, &config.group_id_column)?
                .map(|groups| split_group_ids(&groups, &config.delimiter).contains(group_id))
                .unwrap_or(false))
        })
    }
}

#[async_trait]
impl WebGroupDao for SingleWebGroupDao {
    fn queries(&self) -> &GroupQueries {
        &self.queries
    }

    async fn secondary_groups(&self, user_id: &UserId) -> Vec<GroupId> {
        let config = &self.queries.config().secondary;
        if !config.enabled {
            return Vec::new();
        }

        let result = self.load_secondary_groups(config, user_id).await;
        self.queries.recover(SECONDARY_GROUPS_ERROR, result)
    }

    async fn group_user_ids_primary(&self, group_id: &GroupId) -> Vec<UserId> {
        fetch_primary_user_ids(&self.queries, group_id).await
    }

    async fn group_user_ids_secondary(&self, group_id: &GroupId) -> Vec<UserId> {
        let config = &self.queries.config().secondary;
        if !config.enabled {
            return Vec::new();
        }

        let result = self.load_secondary_members(config, group_id).await;
        self.queries.recover(SECONDARY_USER_IDS_ERROR, result)
    }
}
