pub mod church;
pub mod inquiry;
pub mod member;
pub mod notice;
pub mod profile;
pub mod verification;

pub use church::{Church, Department, Group};
pub use inquiry::Inquiry;
pub use member::{GroupRole, MemberDirectory};
pub use notice::Notice;
pub use profile::{AdminStatus, Profile, ProfileRole};
pub use verification::PhoneVerification;
