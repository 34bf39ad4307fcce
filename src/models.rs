pub mod notification;
pub mod send_request;
pub mod user;

pub use notification::Notification;
pub use send_request::SendRequest;
pub use user::User;
