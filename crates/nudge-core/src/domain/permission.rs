//! Permission - 通知許可の状態

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::NotifyError;

/// PermissionStatus は通知許可の状態
///
/// - granted: 許可済み
/// - denied: 拒否済み（再リクエストしても変わらないことが多い）
/// - undetermined: まだ尋ねていない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionStatus::Granted => "granted",
            PermissionStatus::Denied => "denied",
            PermissionStatus::Undetermined => "undetermined",
        };
        f.write_str(s)
    }
}

impl FromStr for PermissionStatus {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" => Ok(PermissionStatus::Granted),
            "denied" => Ok(PermissionStatus::Denied),
            "undetermined" => Ok(PermissionStatus::Undetermined),
            other => Err(NotifyError::UnknownStatus(other.to_string())),
        }
    }
}
