//! LifecycleSource port - アプリ状態の変化を流す
//!
//! ホストは状態変化を 1 件ずつ順番に届けます（同時に 2 件届くことはない）。
//! 購読側は mpsc の Receiver でそれを受け取り、処理が終わるまで次を取りに行きません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{LifecycleState, SubscriptionId};

/// 1 件の購読
///
/// `events` が閉じたらホスト側が購読を打ち切ったことを意味します。
#[derive(Debug)]
pub struct LifecycleSubscription {
    pub id: SubscriptionId,
    pub events: mpsc::Receiver<LifecycleState>,
}

/// LifecycleSource はホストの lifecycle 変化を購読させる
#[async_trait]
pub trait LifecycleSource: Send + Sync {
    /// 購読開始時点の状態（controller の初期状態になる）
    async fn current(&self) -> LifecycleState;

    /// 新しい購読を作る。`buffer` は mpsc の容量
    async fn subscribe(&self, buffer: usize) -> LifecycleSubscription;

    /// 購読を解除する。未知の id は無視する
    async fn unsubscribe(&self, id: SubscriptionId);
}
