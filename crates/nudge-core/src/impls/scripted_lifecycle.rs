//! ScriptedLifecycle - ホストの代わりに状態を流す lifecycle source
//!
//! `set` を呼ぶと current を更新し、全購読者へ同じ順番で配ります。
//! CLI の `simulate` とテストで使います。
//!
//! 購読者の buffer が埋まっていても `current` / `subscribe` / `unsubscribe` は
//! 待たされません（送信中は状態のロックを持たない）。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::domain::{LifecycleState, SubscriptionId};
use crate::ports::{
    IdGenerator, LifecycleSource, LifecycleSubscription, SystemClock, UlidGenerator,
};

struct LifecycleInner {
    current: LifecycleState,
    subscribers: HashMap<SubscriptionId, mpsc::Sender<LifecycleState>>,
}

pub struct ScriptedLifecycle {
    inner: Mutex<LifecycleInner>,
    /// `set` 同士の配信順を保つ
    send_order: Mutex<()>,
    ids: Arc<dyn IdGenerator>,
}

impl ScriptedLifecycle {
    pub fn new(initial: LifecycleState) -> Self {
        Self {
            inner: Mutex::new(LifecycleInner {
                current: initial,
                subscribers: HashMap::new(),
            }),
            send_order: Mutex::new(()),
            ids: Arc::new(UlidGenerator::new(SystemClock)),
        }
    }

    /// ホストが状態変化を報告した
    ///
    /// 受信側が閉じている購読はここで取り除く。
    pub async fn set(&self, next: LifecycleState) {
        let _order = self.send_order.lock().await;
        let targets: Vec<_> = {
            let mut inner = self.inner.lock().await;
            inner.current = next;
            inner
                .subscribers
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        let mut closed = Vec::new();
        for (id, tx) in targets {
            if tx.send(next).await.is_err() {
                closed.push(id);
            }
        }
        if closed.is_empty() {
            return;
        }

        let mut inner = self.inner.lock().await;
        for id in closed {
            if inner.subscribers.remove(&id).is_some() {
                debug!(%id, "dropping closed lifecycle subscription");
            }
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.inner.lock().await.subscribers.len()
    }
}

#[async_trait]
impl LifecycleSource for ScriptedLifecycle {
    async fn current(&self) -> LifecycleState {
        self.inner.lock().await.current
    }

    async fn subscribe(&self, buffer: usize) -> LifecycleSubscription {
        let (tx, events) = mpsc::channel(buffer.max(1));
        let id = self.ids.subscription_id();
        self.inner.lock().await.subscribers.insert(id, tx);
        debug!(%id, "lifecycle subscription added");
        LifecycleSubscription { id, events }
    }

    async fn unsubscribe(&self, id: SubscriptionId) {
        if self.inner.lock().await.subscribers.remove(&id).is_some() {
            debug!(%id, "lifecycle subscription removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn delivers_in_order_to_every_subscriber() {
        let source = ScriptedLifecycle::new(LifecycleState::Active);
        let mut a = source.subscribe(4).await;
        let mut b = source.subscribe(4).await;

        source.set(LifecycleState::Inactive).await;
        source.set(LifecycleState::Background).await;

        for sub in [&mut a, &mut b] {
            assert_eq!(sub.events.recv().await, Some(LifecycleState::Inactive));
            assert_eq!(sub.events.recv().await, Some(LifecycleState::Background));
        }
        assert_eq!(source.current().await, LifecycleState::Background);
    }

    #[tokio::test]
    async fn unsubscribe_closes_stream() {
        let source = ScriptedLifecycle::new(LifecycleState::Active);
        let mut sub = source.subscribe(1).await;

        source.unsubscribe(sub.id).await;

        assert_eq!(sub.events.recv().await, None);
        assert_eq!(source.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn full_subscriber_does_not_block_other_calls() {
        let source = Arc::new(ScriptedLifecycle::new(LifecycleState::Active));
        let mut slow = source.subscribe(1).await;
        source.set(LifecycleState::Inactive).await;

        // buffer が埋まっているので、この set は受信されるまで送信待ちになる
        let pending = tokio::spawn({
            let source = Arc::clone(&source);
            async move { source.set(LifecycleState::Background).await }
        });
        let limit = Duration::from_secs(1);
        tokio::time::timeout(limit, async {
            while source.current().await != LifecycleState::Background {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert!(!pending.is_finished());
        let other = tokio::time::timeout(limit, source.subscribe(1)).await.unwrap();
        tokio::time::timeout(limit, source.unsubscribe(other.id))
            .await
            .unwrap();

        assert_eq!(slow.events.recv().await, Some(LifecycleState::Inactive));
        assert_eq!(slow.events.recv().await, Some(LifecycleState::Background));
        pending.await.unwrap();
    }

    #[tokio::test]
    async fn dropped_receivers_are_pruned() {
        let source = ScriptedLifecycle::new(LifecycleState::Active);
        let sub = source.subscribe(1).await;
        drop(sub);

        source.set(LifecycleState::Background).await;

        assert_eq!(source.subscriber_count().await, 0);
    }
}
