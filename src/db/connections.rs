use crate::models::{Metadata, StoredConnection};
use crate::service::ConnectionStore;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

/// `t_connection` 上的连接查询
#[derive(Clone)]
pub struct PgConnectionStore {
    pool: PgPool,
}

impl PgConnectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionStore for PgConnectionStore {
    async fn get_connections_by_ids(
        &self,
        connection_ids: &[String],
        provider_config_key: &str,
    ) -> Result<Vec<StoredConnection>, sqlx::Error> {
        sqlx::query_as::<_, StoredConnection>(
            r#"
            SELECT id, connection_id, provider_config_key, connection_token,
                   COALESCE(metadata, '{}'::jsonb) as metadata
            FROM t_connection
            WHERE connection_id = ANY($1)
              AND provider_config_key = $2
            "#,
        )
        .bind(connection_ids)
        .bind(provider_config_key)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_connections_by_tokens(
        &self,
        tokens: &[String],
    ) -> Result<Vec<StoredConnection>, sqlx::Error> {
        sqlx::query_as::<_, StoredConnection>(
            r#"
            SELECT id, connection_id, provider_config_key, connection_token,
                   COALESCE(metadata, '{}'::jsonb) as metadata
            FROM t_connection
            WHERE connection_token = ANY($1)
            "#,
        )
        .bind(tokens)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_metadata(
        &self,
        connections: &[StoredConnection],
        metadata: &Metadata,
    ) -> Result<(), sqlx::Error> {
        let ids: Vec<i64> = connections.iter().map(|c| c.id).collect();
        let result = sqlx::query(
            r#"
            UPDATE t_connection
            SET metadata = COALESCE(metadata, '{}'::jsonb) || $1,
                updated_at = now()
            WHERE id = ANY($2)
            "#,
        )
        .bind(Json(metadata.clone()))
        .bind(&ids)
        .execute(&self.pool)
        .await?;

        tracing::debug!("连接元数据已合并, 影响 {} 行", result.rows_affected());
        Ok(())
    }
}
