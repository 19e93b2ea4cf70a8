//! Manual trigger - "Schedule Notification (30s)" ボタン相当
//!
//! controller とは無関係な単発の予約です。handle は追跡しないので、
//! 何回押しても押した回数だけ通知が届きます。

use std::time::Duration;

use tracing::info;

use crate::domain::{NotificationContent, NotificationHandle, NotifyError};
use crate::ports::NotificationScheduler;

pub async fn schedule_manual(
    scheduler: &dyn NotificationScheduler,
    content: NotificationContent,
    delay: Duration,
) -> Result<NotificationHandle, NotifyError> {
    let handle = scheduler.schedule(content, delay).await?;
    info!(%handle, ?delay, "manual notification scheduled");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryScheduler;

    #[tokio::test(start_paused = true)]
    async fn each_press_schedules_its_own_notification() {
        let scheduler = InMemoryScheduler::new();
        let delay = Duration::from_secs(30);

        let first = schedule_manual(&scheduler, NotificationContent::manual(), delay)
            .await
            .unwrap();
        let second = schedule_manual(&scheduler, NotificationContent::manual(), delay)
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(scheduler.pending().await.len(), 2);

        tokio::time::sleep(delay + Duration::from_millis(1)).await;
        let delivered = scheduler.delivered().await;
        assert_eq!(delivered.len(), 2);
        assert!(
            delivered
                .iter()
                .all(|d| d.content.title == "Test Notification")
        );
    }

    #[tokio::test]
    async fn failure_propagates_to_caller() {
        let scheduler = InMemoryScheduler::new();
        scheduler.fail_next(1);

        let err = schedule_manual(
            &scheduler,
            NotificationContent::manual(),
            Duration::from_secs(30),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, NotifyError::Scheduling(_)));
    }
}
