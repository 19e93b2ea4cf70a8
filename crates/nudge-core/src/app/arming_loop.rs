//! ArmingLoop - controller を駆動する直列イベントループ
//!
//! # フロー
//! 1. lifecycle の mpsc から 1 件受け取る
//! 2. `ArmingController::on_lifecycle_change` で Command を得る
//! 3. Command を scheduler に対して実行（schedule は timeout 付き）
//! 4. 結果を controller に戻し、ArmingEvent を broadcast、status を更新
//! 5. 次のイベントへ
//!
//! 1 件の処理が終わるまで次のイベントを取りに行かないので、
//! schedule が in-flight の間に別の遷移が割り込むことはありません。
//!
//! # 配信後のクリア
//! 予約が受理された時点から `delay` 後を期限として覚えておき、期限が来たら
//! `ArmingController::expired` で handle を外します（`run` は期限でも起きる）。
//! 配信済みの通知を active 復帰時に取り消しに行くことはありません。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use super::controller::{ArmingController, Command};
use super::status::ControllerStatus;
use crate::domain::{
    ArmingEvent, LifecycleState, NotificationContent, NotificationHandle, NotifyError,
};
use crate::ports::NotificationScheduler;

const EVENT_CAPACITY: usize = 64;

/// 受信済みのイベントをすべて取り出す
///
/// 取りこぼし（`Lagged`）があっても止まらず、残っている分を読み続ける。
pub fn drain_events(rx: &mut broadcast::Receiver<ArmingEvent>) -> Vec<ArmingEvent> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => out.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "arming events dropped before they were read");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    out
}

pub struct ArmingLoop {
    controller: ArmingController,
    scheduler: Arc<dyn NotificationScheduler>,
    schedule_timeout: Duration,
    events_tx: broadcast::Sender<ArmingEvent>,
    status_tx: watch::Sender<ControllerStatus>,
    /// 記録中の handle が配信される時刻（ticket と組）
    deadline: Option<(u64, Instant)>,
}

impl ArmingLoop {
    pub fn new(
        controller: ArmingController,
        scheduler: Arc<dyn NotificationScheduler>,
        schedule_timeout: Duration,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (status_tx, _) = watch::channel(ControllerStatus::new(controller.previous_state()));
        Self {
            controller,
            scheduler,
            schedule_timeout,
            events_tx,
            status_tx,
            deadline: None,
        }
    }

    pub fn controller(&self) -> &ArmingController {
        &self.controller
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ArmingEvent> {
        self.events_tx.subscribe()
    }

    pub(crate) fn events_sender(&self) -> broadcast::Sender<ArmingEvent> {
        self.events_tx.clone()
    }

    pub fn status(&self) -> watch::Receiver<ControllerStatus> {
        self.status_tx.subscribe()
    }

    /// イベントを 1 件処理する。scheduler のエラーはここで吸収される
    pub async fn step(&mut self, next: LifecycleState) {
        self.expire_due();

        let from = self.controller.previous_state();
        let command = self.controller.on_lifecycle_change(next);

        self.emit(ArmingEvent::Transition { from, to: next });

        match command {
            Some(Command::Arm {
                ticket,
                content,
                delay,
            }) => self.arm(ticket, content, delay).await,
            Some(Command::Disarm { handle }) => {
                self.cancel(handle).await;
                self.status_tx
                    .send_modify(|status| status.counts.disarmed += 1);
                self.emit(ArmingEvent::Disarmed { handle });
            }
            None => {}
        }

        // transitions を最後に進めるので、watch 側はこの遷移の結果がそろってから見える
        let armed = self.controller.handle();
        if armed.is_none() {
            self.deadline = None;
        }
        self.status_tx.send_modify(|status| {
            status.state = next;
            status.armed = armed;
            status.counts.transitions += 1;
        });
    }

    /// shutdown が来るか lifecycle の stream が閉じるまで回す
    ///
    /// 終了時の controller を返す（最後の状態の確認用）。
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<LifecycleState>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> ArmingController {
        info!(state = %self.controller.previous_state(), "arming loop started");
        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let deadline = self.deadline.map(|(_, at)| at);
            let next = tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // 変更が入ったら次のループで判定
                    continue;
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.expire_due();
                    continue;
                }
                next = events.recv() => next,
            };

            let Some(next) = next else {
                debug!("lifecycle stream closed");
                break;
            };
            self.step(next).await;
        }
        info!(state = %self.controller.previous_state(), "arming loop stopped");
        self.controller
    }

    async fn arm(&mut self, ticket: u64, content: NotificationContent, delay: Duration) {
        let limit = self.schedule_timeout;
        let scheduled = tokio::time::timeout(limit, self.scheduler.schedule(content, delay))
            .await
            .unwrap_or_else(|_| Err(NotifyError::Timeout(limit)));

        match scheduled {
            Ok(handle) => match self.controller.armed(ticket, handle) {
                None => {
                    // scheduler が受理した後から数えるので、配信より早く期限が来ることはない
                    self.deadline = Some((ticket, Instant::now() + delay));
                    self.status_tx.send_modify(|status| status.counts.armed += 1);
                    self.emit(ArmingEvent::Armed { ticket, handle });
                }
                Some(stale) => {
                    self.cancel(stale).await;
                    self.status_tx
                        .send_modify(|status| status.counts.discarded += 1);
                    self.emit(ArmingEvent::Discarded {
                        ticket,
                        handle: stale,
                    });
                }
            },
            Err(err) => {
                self.controller.arm_failed(ticket);
                self.status_tx.send_modify(|status| status.counts.failed += 1);
                self.emit(ArmingEvent::ArmFailed {
                    ticket,
                    reason: err.to_string(),
                });
            }
        }
    }

    /// 期限を過ぎた handle をクリアする（配信済みとみなす）
    fn expire_due(&mut self) {
        let Some((ticket, at)) = self.deadline else {
            return;
        };
        if Instant::now() < at {
            return;
        }
        self.deadline = None;
        if let Some(handle) = self.controller.expired(ticket) {
            self.status_tx.send_modify(|status| {
                status.armed = None;
                status.counts.expired += 1;
            });
            self.emit(ArmingEvent::Expired { ticket, handle });
        }
    }

    /// fire-and-forget: 失敗してもイベントとログに残すだけ
    async fn cancel(&self, handle: NotificationHandle) {
        let limit = self.schedule_timeout;
        let cancelled = tokio::time::timeout(limit, self.scheduler.cancel(handle))
            .await
            .unwrap_or_else(|_| Err(NotifyError::Timeout(limit)));

        if let Err(err) = cancelled {
            self.emit(ArmingEvent::CancelFailed {
                handle,
                reason: err.to_string(),
            });
        }
    }

    fn emit(&self, event: ArmingEvent) {
        match &event {
            ArmingEvent::Transition { from, to } => debug!(%from, %to, "lifecycle transition"),
            ArmingEvent::Armed { ticket, handle } => {
                info!(ticket, %handle, delay = ?self.controller.delay(), "background notification armed")
            }
            ArmingEvent::ArmFailed { ticket, reason } => {
                warn!(ticket, %reason, "error scheduling background notification")
            }
            ArmingEvent::Disarmed { handle } => info!(%handle, "background notification disarmed"),
            ArmingEvent::Expired { ticket, handle } => {
                debug!(ticket, %handle, "background notification delivered; handle cleared")
            }
            ArmingEvent::Discarded { ticket, handle } => {
                info!(ticket, %handle, "discarded notification armed after returning to active")
            }
            ArmingEvent::CancelFailed { handle, reason } => {
                warn!(%handle, %reason, "cancel failed; handle already cleared")
            }
        }
        // receiver がいなくても気にしない
        let _ = self.events_tx.send(event);
    }
}
