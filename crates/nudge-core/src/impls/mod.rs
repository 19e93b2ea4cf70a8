//! Impls - ports の開発用・テスト用実装
//!
//! # 含まれる実装
//! - **InMemoryScheduler**: tokio timer で配信する NotificationScheduler
//! - **ScriptedLifecycle**: `set` で状態を流す LifecycleSource
//! - **StaticPermissions**: 固定の答えを返す PermissionService
//!
//! # 実機用実装
//! プラットフォームの通知 API をラップした実装は別クレートに置く想定です。

pub mod inmem_scheduler;
pub mod scripted_lifecycle;
pub mod static_permissions;

pub use self::inmem_scheduler::{DeliveredNotification, InMemoryScheduler, SchedulerCall};
pub use self::scripted_lifecycle::ScriptedLifecycle;
pub use self::static_permissions::StaticPermissions;
