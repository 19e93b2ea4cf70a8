//! Errors - エラー型と分類
//!
//! # 分類
//! - PermissionDenied: 起動時に一度だけユーザーへ知らせる（リトライしない）
//! - Scheduling / Timeout: arming 中なら握りつぶしてログのみ
//! - Cancel: 呼び出し元には出さない（ログのみ）

use std::time::Duration;

use thiserror::Error;

use super::permission::PermissionStatus;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification permission not granted (status={0})")]
    PermissionDenied(PermissionStatus),

    #[error("scheduling failed: {0}")]
    Scheduling(String),

    #[error("scheduling did not complete within {0:?}")]
    Timeout(Duration),

    #[error("cancel failed: {0}")]
    Cancel(String),

    #[error("unknown lifecycle state: {0}")]
    UnknownState(String),

    #[error("unknown permission status: {0}")]
    UnknownStatus(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
