//! API service models

pub mod class;
pub mod enrollment;
pub mod waitlist;

// Re-export for convenience
pub use class::{
    Class, ClassDetailResponse, ClassSession, ClassStatus, CreateClassRequest,
    CreateSessionRequest, SessionStatus,
};
pub use enrollment::{
    EnrollRequest, Enrollment, EnrollmentStatus, PaymentStatus, ReviewRequest,
};
pub use waitlist::{WaitlistAddRequest, WaitlistEntry, WaitlistStatus, WaitlistStatusRequest};
