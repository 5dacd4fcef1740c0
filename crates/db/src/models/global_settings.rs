//! Global settings singleton row.

use portal_core::features::GlobalSettings;
use portal_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// The single row of the `global_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GlobalSettingsRow {
    pub id: i16,
    pub chat_enabled: bool,
    pub files_enabled: bool,
    pub timeline_enabled: bool,
    pub testing_enabled: bool,
    pub response_bot_enabled: bool,
    pub obeya_enabled: bool,
    pub wiki_enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl GlobalSettingsRow {
    pub fn settings(&self) -> GlobalSettings {
        GlobalSettings {
            chat_enabled: self.chat_enabled,
            files_enabled: self.files_enabled,
            timeline_enabled: self.timeline_enabled,
            testing_enabled: self.testing_enabled,
            response_bot_enabled: self.response_bot_enabled,
            obeya_enabled: self.obeya_enabled,
            wiki_enabled: self.wiki_enabled,
        }
    }
}
