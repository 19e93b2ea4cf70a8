//! Configuration loaded from TOML.
//!
//! すべてのフィールドに既定値があるので、空のファイルでも有効です。
//!
//! ```toml
//! arming_delay_secs = 30
//! schedule_timeout_ms = 5000
//!
//! [background]
//! title = "Background Notification"
//! body = "The app has been in background for 30 seconds!"
//! data = { type = "background" }
//!
//! [presentation]
//! set_badge = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{NotificationContent, NotifyError, PresentationOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NudgeConfig {
    /// background に入ってから通知が届くまでの秒数
    pub arming_delay_secs: u64,
    /// 手動ボタンで予約する通知の秒数
    pub manual_delay_secs: u64,
    /// scheduler の応答を待つ上限（超えたら arming 失敗扱い）
    pub schedule_timeout_ms: u64,
    /// lifecycle イベントの mpsc 容量
    pub event_buffer: usize,
    pub background: NotificationContent,
    pub manual: NotificationContent,
    /// foreground で通知が届いたときの表示方法
    pub presentation: PresentationOptions,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            arming_delay_secs: 30,
            manual_delay_secs: 30,
            schedule_timeout_ms: 5_000,
            event_buffer: 16,
            background: NotificationContent::background(),
            manual: NotificationContent::manual(),
            presentation: PresentationOptions::default(),
        }
    }
}

impl NudgeConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_file(path: &Path) -> Result<Self, NotifyError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, NotifyError> {
        let config: Self = toml::from_str(content).map_err(|e| NotifyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 実効設定を TOML にする（`nudge config` の出力）
    pub fn to_toml(&self) -> Result<String, NotifyError> {
        toml::to_string_pretty(self).map_err(|e| NotifyError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), NotifyError> {
        if self.arming_delay_secs == 0 {
            return Err(NotifyError::Config("arming_delay_secs must be positive".into()));
        }
        if self.manual_delay_secs == 0 {
            return Err(NotifyError::Config("manual_delay_secs must be positive".into()));
        }
        if self.schedule_timeout_ms == 0 {
            return Err(NotifyError::Config("schedule_timeout_ms must be positive".into()));
        }
        if self.event_buffer == 0 {
            return Err(NotifyError::Config("event_buffer must be at least 1".into()));
        }
        Ok(())
    }

    pub fn arming_delay(&self) -> Duration {
        Duration::from_secs(self.arming_delay_secs)
    }

    pub fn manual_delay(&self) -> Duration {
        Duration::from_secs(self.manual_delay_secs)
    }

    pub fn schedule_timeout(&self) -> Duration {
        Duration::from_millis(self.schedule_timeout_ms)
    }
}
