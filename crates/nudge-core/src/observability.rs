//! tracing の初期化
//!
//! `RUST_LOG` があればそれを使い、なければ `default_filter` を使います。
//! 出力は stderr（stdout は CLI の JSON 出力に使う）。

use tracing_subscriber::EnvFilter;

/// 二重初期化は無視する（テストや埋め込み先で既に subscriber がある場合）
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
