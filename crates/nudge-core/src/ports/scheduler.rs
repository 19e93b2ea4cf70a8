//! NotificationScheduler port - プラットフォームの通知 API
//!
//! # 実装
//! - **InMemoryScheduler**: tokio timer で配信する開発用実装（impls）
//! - 実機: iOS / Android のローカル通知 API をラップしたアダプタ

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{NotificationContent, NotificationHandle, NotifyError, PresentationOptions};

/// NotificationScheduler は時間トリガーのローカル通知を予約・取り消す
///
/// # 設計原則
/// - `schedule` は予約が受理された時点で handle を返す（配信を待たない）
/// - `cancel` は未配信の通知を取り消す。既に配信済み・未知の handle でも Ok を返してよい
/// - `set_presentation` は起動時に 1 回呼ばれ、以後 foreground で届く通知すべてに効く
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn schedule(
        &self,
        content: NotificationContent,
        delay: Duration,
    ) -> Result<NotificationHandle, NotifyError>;

    async fn cancel(&self, handle: NotificationHandle) -> Result<(), NotifyError>;

    async fn set_presentation(&self, options: PresentationOptions) -> Result<(), NotifyError>;
}
