//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::ids::{NotificationHandle, SubscriptionId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は通知ハンドルと購読 ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（scheduler の timer task からも使う）
pub trait IdGenerator: Send + Sync {
    fn notification_handle(&self) -> NotificationHandle;

    fn subscription_id(&self) -> SubscriptionId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// テスト時に FixedClock を使うと timestamp 部分が固定されます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn notification_handle(&self) -> NotificationHandle {
        NotificationHandle::from(self.next_ulid())
    }

    fn subscription_id(&self) -> SubscriptionId {
        SubscriptionId::from(self.next_ulid())
    }
}
