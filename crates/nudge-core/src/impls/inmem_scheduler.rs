//! InMemoryScheduler - 開発用の通知スケジューラ
//!
//! # 実装詳細
//! - 予約ごとに tokio task を spawn し、`sleep(delay)` 後に「配信」する
//! - cancel は task を abort して pending から外す
//! - 呼び出し履歴（`calls`）と配信履歴（`delivered`）をテスト用に残す
//! - `fail_next` / `fail_next_cancel` で失敗を注入できる
//! - 配信時点の PresentationOptions を配信記録に添える

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::{NotificationContent, NotificationHandle, NotifyError, PresentationOptions};
use crate::ports::{Clock, IdGenerator, NotificationScheduler, SystemClock, UlidGenerator};

/// scheduler に対して行われた呼び出し
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCall {
    Schedule { title: String, delay: Duration },
    Cancel { handle: NotificationHandle },
}

/// 配信された通知
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveredNotification {
    pub handle: NotificationHandle,
    pub content: NotificationContent,
    pub presentation: PresentationOptions,
    pub scheduled_at: DateTime<Utc>,
    pub delivered_at: DateTime<Utc>,
}

struct PendingEntry {
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct SchedulerState {
    pending: HashMap<NotificationHandle, PendingEntry>,
    delivered: Vec<DeliveredNotification>,
    calls: Vec<SchedulerCall>,
    presentation: PresentationOptions,
}

pub struct InMemoryScheduler {
    state: Arc<Mutex<SchedulerState>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    delivered_tx: broadcast::Sender<DeliveredNotification>,
    remaining_failures: AtomicU32,
    remaining_cancel_failures: AtomicU32,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::with_clock(clock)
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let (delivered_tx, _) = broadcast::channel(64);
        Self {
            state: Arc::new(Mutex::new(SchedulerState::default())),
            ids: Arc::new(UlidGenerator::new(clock.clone())),
            clock,
            delivered_tx,
            remaining_failures: AtomicU32::new(0),
            remaining_cancel_failures: AtomicU32::new(0),
        }
    }

    /// 次の `n` 回の schedule を失敗させる
    pub fn fail_next(&self, n: u32) {
        self.remaining_failures.store(n, Ordering::Relaxed);
    }

    /// 次の `n` 回の cancel を失敗させる
    pub fn fail_next_cancel(&self, n: u32) {
        self.remaining_cancel_failures.store(n, Ordering::Relaxed);
    }

    pub fn subscribe_delivered(&self) -> broadcast::Receiver<DeliveredNotification> {
        self.delivered_tx.subscribe()
    }

    pub async fn calls(&self) -> Vec<SchedulerCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn delivered(&self) -> Vec<DeliveredNotification> {
        self.state.lock().await.delivered.clone()
    }

    /// まだ配信されていない handle（順不同）
    pub async fn pending(&self) -> Vec<NotificationHandle> {
        self.state.lock().await.pending.keys().copied().collect()
    }

    pub async fn presentation(&self) -> PresentationOptions {
        self.state.lock().await.presentation
    }
}

impl Default for InMemoryScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// 残り回数があれば 1 減らして true
fn take_failure(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |left| left.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl NotificationScheduler for InMemoryScheduler {
    async fn schedule(
        &self,
        content: NotificationContent,
        delay: Duration,
    ) -> Result<NotificationHandle, NotifyError> {
        let mut state = self.state.lock().await;
        state.calls.push(SchedulerCall::Schedule {
            title: content.title.clone(),
            delay,
        });

        if take_failure(&self.remaining_failures) {
            return Err(NotifyError::Scheduling("injected failure".to_string()));
        }

        let handle = self.ids.notification_handle();
        let scheduled_at = self.clock.now();

        // timer は state のロックを取るので、pending への登録が終わるまで配信できない
        let timer = tokio::spawn({
            let shared = Arc::clone(&self.state);
            let clock = Arc::clone(&self.clock);
            let delivered_tx = self.delivered_tx.clone();
            async move {
                tokio::time::sleep(delay).await;
                let mut state = shared.lock().await;
                if state.pending.remove(&handle).is_none() {
                    return;
                }
                let delivered = DeliveredNotification {
                    handle,
                    content,
                    presentation: state.presentation,
                    scheduled_at,
                    delivered_at: clock.now(),
                };
                if delivered.presentation.is_silent() {
                    debug!(%handle, title = %delivered.content.title, "notification delivered silently");
                } else {
                    info!(%handle, title = %delivered.content.title, "notification delivered");
                }
                state.delivered.push(delivered.clone());
                let _ = delivered_tx.send(delivered);
            }
        });
        state.pending.insert(handle, PendingEntry { timer });
        debug!(%handle, ?delay, "notification scheduled");
        Ok(handle)
    }

    async fn cancel(&self, handle: NotificationHandle) -> Result<(), NotifyError> {
        let mut state = self.state.lock().await;
        state.calls.push(SchedulerCall::Cancel { handle });

        if take_failure(&self.remaining_cancel_failures) {
            return Err(NotifyError::Cancel("injected failure".to_string()));
        }

        match state.pending.remove(&handle) {
            Some(entry) => {
                entry.timer.abort();
                debug!(%handle, "notification cancelled");
            }
            None => debug!(%handle, "cancel for unknown or delivered notification"),
        }
        Ok(())
    }

    async fn set_presentation(&self, options: PresentationOptions) -> Result<(), NotifyError> {
        self.state.lock().await.presentation = options;
        debug!(?options, "presentation options set");
        Ok(())
    }
}
