//! Domain model (lifecycle, handles, content, presentation, permission, errors, events).

pub mod content;
pub mod errors;
pub mod events;
pub mod ids;
pub mod lifecycle;
pub mod permission;
pub mod presentation;

pub use self::content::NotificationContent;
pub use self::errors::NotifyError;
pub use self::events::ArmingEvent;
pub use self::ids::{Id, IdMarker, NotificationHandle, SubscriptionId};
pub use self::lifecycle::LifecycleState;
pub use self::permission::PermissionStatus;
pub use self::presentation::PresentationOptions;
