//! Events - arming loop が発行するイベント
//!
//! loop はすべての結果をこのイベントとして broadcast し、同じものを tracing に流します。
//! scheduler の失敗は呼び出し元へ伝播させず、ここで `ArmFailed` として観測できるだけです。

use serde::{Deserialize, Serialize};

use super::ids::NotificationHandle;
use super::lifecycle::LifecycleState;

/// ArmingEvent は 1 回の遷移処理で起きたこと
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ArmingEvent {
    /// 遷移を受け取った（副作用の有無に関係なく毎回出る）
    Transition {
        from: LifecycleState,
        to: LifecycleState,
    },
    /// background 通知を予約し、handle を記録した
    Armed { ticket: u64, handle: NotificationHandle },
    /// 予約に失敗した（リトライしない）
    ArmFailed { ticket: u64, reason: String },
    /// active に戻ったので予約を取り消した
    Disarmed { handle: NotificationHandle },
    /// 予約した通知が配信されたので handle をクリアした
    Expired { ticket: u64, handle: NotificationHandle },
    /// 既に無効になった arming の結果が後から届いたので取り消した
    Discarded { ticket: u64, handle: NotificationHandle },
    /// cancel が失敗した（handle はすでにクリア済み）
    CancelFailed {
        handle: NotificationHandle,
        reason: String,
    },
}
