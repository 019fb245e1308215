pub mod content;
pub mod hooks;
pub mod ratings;
pub mod roles;
pub mod subscriptions;

pub use content::ContentService;
pub use hooks::Hooks;
