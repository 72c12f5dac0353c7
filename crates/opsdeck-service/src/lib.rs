//! # opsdeck-service
//!
//! Request context plus the thin collaborator-facing services of the
//! session subsystem: admin session listing and the notification read
//! path.

pub mod context;
pub mod notification;
pub mod session;

pub use context::RequestContext;
pub use notification::NotificationReadService;
pub use session::SessionQueryService;
