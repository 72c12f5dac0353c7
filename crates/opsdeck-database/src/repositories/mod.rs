//! Concrete repository implementations.

pub mod auth_event;
pub mod notification;
pub mod settings;
pub mod user;

pub use auth_event::AuthEventRepository;
pub use notification::NotificationRepository;
pub use settings::SettingsRepository;
pub use user::UserRepository;
