//! Domain identifiers (strongly-typed IDs).
//!
//! # ULID ベースの ID
//! スケジュール済み通知のハンドルと lifecycle 購読の ID は、どちらも ULID を
//! 内部に持つ `Id<T>` で表現します。`T` は PhantomData のマーカー型なので、
//! `NotificationHandle` と `SubscriptionId` を取り違えるとコンパイルエラーになります。
//!
//! ## ULID の特性
//! - **時刻でソート可能**: 生成順に並ぶので、ログ上で arming の順序を追える
//! - **調整なしで生成可能**: scheduler 実装ごとに採番しても衝突しない

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"notif-", "sub-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// # 例
/// ```ignore
/// let handle: NotificationHandle = Id::from(Ulid::new());
/// let sub: SubscriptionId = Id::from(Ulid::new());
/// // handle と sub は異なる型なので、cancel(sub) のような誤用はできない
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// ULID から Id を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// スケジュール済み通知のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Notification {}

impl IdMarker for Notification {
    fn prefix() -> &'static str {
        "notif-"
    }
}

/// lifecycle 購読のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subscription {}

impl IdMarker for Subscription {
    fn prefix() -> &'static str {
        "sub-"
    }
}

// ========================================
// Type Alias
// ========================================

/// Identifier of one scheduled-but-undelivered notification.
pub type NotificationHandle = Id<Notification>;

/// Identifier of one lifecycle subscription.
pub type SubscriptionId = Id<Subscription>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_marker_prefix() {
        let ulid = Ulid::new();
        let handle = NotificationHandle::from_ulid(ulid);
        let sub = SubscriptionId::from_ulid(ulid);

        assert_eq!(handle.to_string(), format!("notif-{ulid}"));
        assert_eq!(sub.to_string(), format!("sub-{ulid}"));
        assert_eq!(handle.as_ulid(), sub.as_ulid());
    }

    #[test]
    fn handles_survive_json() {
        let handle: NotificationHandle = Ulid::new().into();

        let serialized = serde_json::to_string(&handle).unwrap();
        let deserialized: NotificationHandle = serde_json::from_str(&serialized).unwrap();

        assert_eq!(handle, deserialized);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;

        assert_eq!(size_of::<NotificationHandle>(), size_of::<Ulid>());
        assert_eq!(size_of::<SubscriptionId>(), size_of::<Ulid>());
    }
}
