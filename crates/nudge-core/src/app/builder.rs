//! AppBuilder - ports のワイヤリングと起動
//!
//! # Fail-fast 設計
//! - scheduler / permission service / lifecycle source のどれかが欠けていたら
//!   `build()` が BuildError を返す
//! - config も `build()` の時点で検証する
//!
//! # 起動
//! `App::start` は次の順で動きます。
//! 1. foreground 表示方法を scheduler に設定
//! 2. 通知許可を確認（拒否されても loop は起動する。ホストがアラートを出す）
//! 3. lifecycle を購読し、その時点の状態で controller を初期化
//! 4. ArmingLoop を spawn

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

use super::arming_loop::ArmingLoop;
use super::controller::ArmingController;
use super::manual::schedule_manual;
use super::permission::{denial_alert, ensure_permission};
use super::status::ControllerStatus;
use crate::config::NudgeConfig;
use crate::domain::{
    ArmingEvent, NotificationHandle, NotifyError, PermissionStatus, SubscriptionId,
};
use crate::ports::{LifecycleSource, NotificationScheduler, PermissionService};

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing port: {0}")]
    MissingPort(&'static str),

    #[error("invalid config: {0}")]
    InvalidConfig(NotifyError),
}

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .scheduler(Arc::new(InMemoryScheduler::new()))
///     .permissions(Arc::new(StaticPermissions::granted()))
///     .lifecycle(lifecycle.clone())
///     .config(config)
///     .build()?;
/// let running = app.start().await;
/// ```
#[derive(Default)]
pub struct AppBuilder {
    scheduler: Option<Arc<dyn NotificationScheduler>>,
    permissions: Option<Arc<dyn PermissionService>>,
    lifecycle: Option<Arc<dyn LifecycleSource>>,
    config: NudgeConfig,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn NotificationScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn permissions(mut self, permissions: Arc<dyn PermissionService>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn lifecycle(mut self, lifecycle: Arc<dyn LifecycleSource>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn config(mut self, config: NudgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        let scheduler = self.scheduler.ok_or(BuildError::MissingPort("scheduler"))?;
        let permissions = self
            .permissions
            .ok_or(BuildError::MissingPort("permissions"))?;
        let lifecycle = self.lifecycle.ok_or(BuildError::MissingPort("lifecycle"))?;
        self.config.validate().map_err(BuildError::InvalidConfig)?;

        Ok(App {
            scheduler,
            permissions,
            lifecycle,
            config: self.config,
        })
    }
}

/// App は起動前のアプリケーション
pub struct App {
    scheduler: Arc<dyn NotificationScheduler>,
    permissions: Arc<dyn PermissionService>,
    lifecycle: Arc<dyn LifecycleSource>,
    config: NudgeConfig,
}

impl App {
    pub async fn start(self) -> RunningApp {
        if let Err(err) = self.scheduler.set_presentation(self.config.presentation).await {
            warn!(error = %err, "could not set presentation options; using platform defaults");
        }

        let permission = match ensure_permission(self.permissions.as_ref()).await {
            Ok(status) => status,
            Err(NotifyError::PermissionDenied(status)) => status,
            Err(other) => {
                // ensure_permission は PermissionDenied しか返さない
                warn!(error = %other, "permission check failed");
                PermissionStatus::Undetermined
            }
        };

        // 購読してから current を読むので、その間の変化を取りこぼさない
        let subscription = self.lifecycle.subscribe(self.config.event_buffer).await;
        let initial = self.lifecycle.current().await;

        let controller = ArmingController::new(
            initial,
            self.config.arming_delay(),
            self.config.background.clone(),
        );
        let arming_loop = ArmingLoop::new(
            controller,
            Arc::clone(&self.scheduler),
            self.config.schedule_timeout(),
        );
        let status = arming_loop.status();
        let events_tx = arming_loop.events_sender();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(arming_loop.run(subscription.events, shutdown_rx));
        info!(%initial, subscription = %subscription.id, %permission, "app started");

        RunningApp {
            permission,
            status,
            events_tx,
            shutdown_tx,
            join,
            lifecycle: self.lifecycle,
            subscription: subscription.id,
            scheduler: self.scheduler,
            config: self.config,
        }
    }
}

/// 起動済みアプリのハンドル
///
/// - `shutdown()` で loop を止めて lifecycle の購読を解除する
/// - drop しただけでは loop は止まらない（lifecycle stream が閉じるまで動く）
pub struct RunningApp {
    permission: PermissionStatus,
    status: watch::Receiver<ControllerStatus>,
    events_tx: broadcast::Sender<ArmingEvent>,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<ArmingController>,
    lifecycle: Arc<dyn LifecycleSource>,
    subscription: SubscriptionId,
    scheduler: Arc<dyn NotificationScheduler>,
    config: NudgeConfig,
}

impl RunningApp {
    /// 起動時に確定した通知許可
    pub fn permission(&self) -> PermissionStatus {
        self.permission
    }

    /// 許可がないときにユーザーへ出すアラート
    pub fn permission_alert(&self) -> Option<&'static str> {
        denial_alert(self.permission)
    }

    pub fn status(&self) -> ControllerStatus {
        self.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<ControllerStatus> {
        self.status.clone()
    }

    pub fn events(&self) -> broadcast::Receiver<ArmingEvent> {
        self.events_tx.subscribe()
    }

    /// 手動ボタン: controller とは独立に 1 件予約する
    pub async fn schedule_manual(&self) -> Result<NotificationHandle, NotifyError> {
        schedule_manual(
            self.scheduler.as_ref(),
            self.config.manual.clone(),
            self.config.manual_delay(),
        )
        .await
    }

    pub async fn shutdown(self) -> Result<ArmingController, JoinError> {
        // receiver がもういなくても気にしない
        let _ = self.shutdown_tx.send(true);
        let controller = self.join.await;
        self.lifecycle.unsubscribe(self.subscription).await;
        controller
    }
}
