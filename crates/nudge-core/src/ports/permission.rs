//! PermissionService port - 通知許可の問い合わせ

use async_trait::async_trait;

use crate::domain::PermissionStatus;

/// PermissionService は通知許可を確認・要求する
///
/// `request` は OS のダイアログを出す可能性があるので、起動時に一度だけ呼ぶ想定です。
#[async_trait]
pub trait PermissionService: Send + Sync {
    async fn status(&self) -> PermissionStatus;

    async fn request(&self) -> PermissionStatus;
}
