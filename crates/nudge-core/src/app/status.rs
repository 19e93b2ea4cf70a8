//! Status - controller のスナップショット
//!
//! loop は遷移を 1 件処理するたびに watch channel で最新の状態を公開します。

use serde::{Deserialize, Serialize};

use crate::domain::{LifecycleState, NotificationHandle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmingCounts {
    pub transitions: u64,
    pub armed: u64,
    pub disarmed: u64,
    pub expired: u64,
    pub failed: u64,
    pub discarded: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerStatus {
    pub state: LifecycleState,
    pub armed: Option<NotificationHandle>,
    pub counts: ArmingCounts,
}

impl ControllerStatus {
    pub fn new(state: LifecycleState) -> Self {
        Self {
            state,
            armed: None,
            counts: ArmingCounts::default(),
        }
    }
}
