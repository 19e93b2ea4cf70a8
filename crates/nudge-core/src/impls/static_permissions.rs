//! StaticPermissions - 固定の答えを返す permission service
//!
//! `status` は現在値、`request` は設定された値に切り替えてそれを返します。

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::domain::PermissionStatus;
use crate::ports::PermissionService;

pub struct StaticPermissions {
    current: Mutex<PermissionStatus>,
    on_request: PermissionStatus,
    requests: AtomicU32,
}

impl StaticPermissions {
    pub fn new(current: PermissionStatus, on_request: PermissionStatus) -> Self {
        Self {
            current: Mutex::new(current),
            on_request,
            requests: AtomicU32::new(0),
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionStatus::Granted, PermissionStatus::Granted)
    }

    /// `request` が呼ばれた回数
    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PermissionStatus> {
        // PermissionStatus は Copy なので poison されても中身は壊れない
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PermissionService for StaticPermissions {
    async fn status(&self) -> PermissionStatus {
        *self.lock()
    }

    async fn request(&self) -> PermissionStatus {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let mut current = self.lock();
        *current = self.on_request;
        *current
    }
}
