//! Content - 通知の中身（title / body / data）

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// NotificationContent は scheduler に渡す通知の中身
///
/// `data` は通知タップ時にアプリへ渡される任意の JSON object です。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl NotificationContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: Map::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// バックグラウンド滞在 30 秒で届く通知
    pub fn background() -> Self {
        Self::new(
            "Background Notification",
            "The app has been in background for 30 seconds!",
        )
        .with_data("type", "background")
    }

    /// 手動ボタン（"Schedule Notification (30s)"）で予約する通知
    pub fn manual() -> Self {
        Self::new(
            "Test Notification",
            "This notification was scheduled 30 seconds ago!",
        )
        .with_data("testData", "Hello from notification!")
    }
}
