//! Lifecycle - ホストが報告するアプリの実行状態

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::NotifyError;

/// LifecycleState はホスト（OS / ランタイム）が報告するアプリの状態
///
/// # 状態
/// - active: 前面で実行中
/// - background: バックグラウンドに送られた
/// - inactive: 遷移中（通知センター表示中など）
///
/// controller はこの値を読むだけで、書き換えるのは常にホスト側です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Active,
    Background,
    Inactive,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Active => "active",
            LifecycleState::Background => "background",
            LifecycleState::Inactive => "inactive",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(LifecycleState::Active),
            "background" => Ok(LifecycleState::Background),
            "inactive" => Ok(LifecycleState::Inactive),
            other => Err(NotifyError::UnknownState(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::active("active", LifecycleState::Active)]
    #[case::background("Background", LifecycleState::Background)]
    #[case::inactive(" inactive ", LifecycleState::Inactive)]
    fn parses_host_names(#[case] raw: &str, #[case] expected: LifecycleState) {
        assert_eq!(raw.parse::<LifecycleState>().unwrap(), expected);
    }

    #[test]
    fn unknown_state_is_rejected() {
        let err = "suspended".parse::<LifecycleState>().unwrap_err();
        assert!(matches!(err, NotifyError::UnknownState(s) if s == "suspended"));
    }

    #[test]
    fn display_matches_serde_name() {
        for state in [
            LifecycleState::Active,
            LifecycleState::Background,
            LifecycleState::Inactive,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
        }
    }
}
