pub mod analysis;
pub mod legacy;
pub mod resume;
pub mod user;

pub use analysis::{AtsAnalysis, ScoreBand};
pub use resume::{
    Award, BasicDetails, Certification, Education, Experience, Project, ResumeRecord,
};
pub use user::User;
