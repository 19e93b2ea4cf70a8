//! Ports - 外部コラボレータの抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」です。通知 API・許可ダイアログ・
//! lifecycle イベントはすべてプラットフォーム側にあるので、ここでは trait だけを定義し、
//! 開発用の実装は `impls` に置きます。

pub mod clock;
pub mod id_generator;
pub mod lifecycle;
pub mod permission;
pub mod scheduler;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::lifecycle::{LifecycleSource, LifecycleSubscription};
pub use self::permission::PermissionService;
pub use self::scheduler::NotificationScheduler;
