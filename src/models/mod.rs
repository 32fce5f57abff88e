mod application;
mod candidate;
mod company;
mod job;
mod membership;
mod plan;
mod system_value;
mod user;

pub use application::{Application, ApplicationStage};
pub use candidate::{Candidate, CandidateSource};
pub use company::{Company, CompanyStatus, CompanySummary};
pub use job::{Job, JobStatus};
pub use membership::{Membership, MembershipStatus, Role};
pub use plan::Plan;
pub use system_value::SystemValue;
pub use user::User;
