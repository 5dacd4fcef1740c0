//! Repository for the `global_settings` singleton.

use portal_core::features::{FeatureKey, GlobalSettings};
use sqlx::PgPool;

use crate::models::global_settings::GlobalSettingsRow;

const COLUMNS: &str = "id, chat_enabled, files_enabled, timeline_enabled, testing_enabled, \
     response_bot_enabled, obeya_enabled, wiki_enabled, created_at, updated_at";

/// Reads and writes the single settings row (`id = 1`).
pub struct GlobalSettingsRepo;

impl GlobalSettingsRepo {
    /// Fetch the settings row, if it has been created.
    pub async fn find(pool: &PgPool) -> Result<Option<GlobalSettingsRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM global_settings WHERE id = 1");
        sqlx::query_as::<_, GlobalSettingsRow>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Insert the settings row. If another request created it first, the
    /// existing row is returned unchanged.
    pub async fn insert(
        pool: &PgPool,
        settings: &GlobalSettings,
    ) -> Result<GlobalSettingsRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO global_settings \
                (id, chat_enabled, files_enabled, timeline_enabled, testing_enabled, \
                 response_bot_enabled, obeya_enabled, wiki_enabled) \
             VALUES (1, $1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GlobalSettingsRow>(&query)
            .bind(settings.chat_enabled)
            .bind(settings.files_enabled)
            .bind(settings.timeline_enabled)
            .bind(settings.testing_enabled)
            .bind(settings.response_bot_enabled)
            .bind(settings.obeya_enabled)
            .bind(settings.wiki_enabled)
            .fetch_one(pool)
            .await
    }

    /// Write one flag. Returns `None` if the row does not exist yet.
    pub async fn set_flag(
        pool: &PgPool,
        key: FeatureKey,
        value: bool,
    ) -> Result<Option<GlobalSettingsRow>, sqlx::Error> {
        // The column name comes from a closed enum, never from user input.
        let query = format!(
            "UPDATE global_settings SET {} = $1 WHERE id = 1 RETURNING {COLUMNS}",
            key.settings_column()
        );
        sqlx::query_as::<_, GlobalSettingsRow>(&query)
            .bind(value)
            .fetch_optional(pool)
            .await
    }
}
