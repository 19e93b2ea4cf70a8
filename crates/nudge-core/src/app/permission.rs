//! Permission gate - 起動時の通知許可チェック
//!
//! 現在の状態を確認し、granted でなければ一度だけ要求します。
//! それでも granted にならなければ `PermissionDenied` を返し、ホストがアラートを出します。
//! リトライのループは持ちません。

use tracing::{debug, info, warn};

use crate::domain::{NotifyError, PermissionStatus};
use crate::ports::PermissionService;

pub async fn ensure_permission(
    service: &dyn PermissionService,
) -> Result<PermissionStatus, NotifyError> {
    let existing = service.status().await;
    debug!(status = %existing, "existing notification permission");

    let status = if existing.is_granted() {
        existing
    } else {
        let requested = service.request().await;
        info!(before = %existing, after = %requested, "requested notification permission");
        requested
    };

    if !status.is_granted() {
        warn!(%status, "permission not granted for notifications");
        return Err(NotifyError::PermissionDenied(status));
    }
    Ok(status)
}

/// granted でなければホストが一度だけ出すアラート文言
pub fn denial_alert(status: PermissionStatus) -> Option<&'static str> {
    (!status.is_granted()).then_some("Permission not granted for notifications")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::StaticPermissions;
    use rstest::rstest;

    #[tokio::test]
    async fn granted_does_not_request() {
        let service = StaticPermissions::new(PermissionStatus::Granted, PermissionStatus::Denied);

        let status = ensure_permission(&service).await.unwrap();

        assert_eq!(status, PermissionStatus::Granted);
        assert_eq!(service.requests(), 0);
    }

    #[tokio::test]
    async fn undetermined_is_requested_once() {
        let service =
            StaticPermissions::new(PermissionStatus::Undetermined, PermissionStatus::Granted);

        let status = ensure_permission(&service).await.unwrap();

        assert_eq!(status, PermissionStatus::Granted);
        assert_eq!(service.requests(), 1);
    }

    #[rstest]
    #[case::granted(PermissionStatus::Granted, None)]
    #[case::denied(PermissionStatus::Denied, Some("Permission not granted for notifications"))]
    #[case::undetermined(
        PermissionStatus::Undetermined,
        Some("Permission not granted for notifications")
    )]
    fn alert_only_when_not_granted(
        #[case] status: PermissionStatus,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(denial_alert(status), expected);
    }

    #[rstest]
    #[case::denied_stays_denied(PermissionStatus::Denied, PermissionStatus::Denied)]
    #[case::dismissed(PermissionStatus::Undetermined, PermissionStatus::Undetermined)]
    #[tokio::test]
    async fn refusal_is_reported_without_retry(
        #[case] initial: PermissionStatus,
        #[case] on_request: PermissionStatus,
    ) {
        let service = StaticPermissions::new(initial, on_request);

        let err = ensure_permission(&service).await.unwrap_err();

        assert!(matches!(err, NotifyError::PermissionDenied(s) if s == on_request));
        assert_eq!(service.requests(), 1);
    }
}
