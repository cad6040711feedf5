//! One row per secondary membership.
//!
//! Covers the `junction` and `multiple-key-value` storage methods, where a
//! user in three groups has three rows, optionally scoped by a key column.

use async_trait::async_trait;

use groupbridge_domain::{GroupId, SecondaryGroupConfig, UserId};

use crate::infrastructure::ports::QueryError;

use super::{
    collect_user_ids, fetch_primary_user_ids, statements, text, GroupQueries, WebGroupDao,
    SECONDARY_GROUPS_ERROR, SECONDARY_USER_IDS_ERROR,
};

pub struct JunctionWebGroupDao {
    queries: GroupQueries,
}

impl JunctionWebGroupDao {
    pub fn new(queries: GroupQueries) -> Self {
        Self { queries }
    }

    async fn load_secondary_groups(
        &self,
        config: &SecondaryGroupConfig,
        user_id: &UserId,
    ) -> Result<Vec<GroupId>, QueryError> {
        let rows = self
            .queries
            .fetch(
                "secondary_groups",
                statements::secondary_groups_by_user(config, user_id),
            )
            .await?;

        let mut group_ids = Vec::new();
        for row in rows {
            if let Some(group_id) = text(&row, &config.group_id_column)? {
                let group_id = group_id.trim();
                if !group_id.is_empty() {
                    group_ids.push(GroupId::from(group_id));
                }
            }
        }
        Ok(group_ids)
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
                statements::secondary_users_by_group(config, group_id),
            )
            .await?;
        collect_user_ids(rows, &config.user_id_column)
    }
}

#[async_trait]
impl WebGroupDao for JunctionWebGroupDao {
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
