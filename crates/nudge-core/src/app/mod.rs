//! App - アプリケーション層
//!
//! ports を組み合わせて arming / disarming を動かします。
//!
//! # 主要コンポーネント
//! - **ArmingController**: lifecycle 遷移の純粋な状態機械
//! - **ArmingLoop**: controller を直列に駆動し、scheduler を呼ぶ
//! - **ensure_permission**: 起動時の通知許可チェック
//! - **schedule_manual**: 手動ボタンの単発予約
//! - **AppBuilder / App / RunningApp**: ワイヤリングと起動
//! - **ControllerStatus**: 観測用スナップショット

pub mod arming_loop;
pub mod builder;
pub mod controller;
pub mod manual;
pub mod permission;
pub mod status;

pub use self::arming_loop::{ArmingLoop, drain_events};
pub use self::builder::{App, AppBuilder, BuildError, RunningApp};
pub use self::controller::{ArmingController, Command};
pub use self::manual::schedule_manual;
pub use self::permission::{denial_alert, ensure_permission};
pub use self::status::{ArmingCounts, ControllerStatus};
