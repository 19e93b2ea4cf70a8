//! nudge-core
//!
//! ローカル通知の arming / disarming を行うコアライブラリ。
//!
//! アプリがバックグラウンドに送られたら一定時間後の通知を 1 件予約し、
//! 届く前に前面へ戻ってきたらそれを取り消します。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（lifecycle, ids, content, permission, errors, events）
//! - **ports**: 抽象化レイヤー（NotificationScheduler, PermissionService, LifecycleSource, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（controller, arming_loop, permission, manual, builder, status）
//! - **impls**: 実装（InMemoryScheduler など開発用）
//! - **config**: TOML 設定
//! - **observability**: tracing の初期化

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
