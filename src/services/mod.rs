pub mod export;
pub mod stats;
pub mod verification;

pub use export::{department_export, DepartmentExport};
pub use stats::{church_stats, ChurchStats};
pub use verification::{IssuedCode, VerificationError, VerificationService};
