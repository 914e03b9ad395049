pub mod extract_members;
pub mod refine_prayers;
pub mod send_sms;
pub mod verify_sms;

pub use extract_members::extract_members;
pub use refine_prayers::refine_prayers;
pub use send_sms::send_sms;
pub use verify_sms::verify_sms;
