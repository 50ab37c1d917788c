//! File-backed persistence helpers

pub mod atomic;
pub mod prep_requirements;

pub use atomic::write_atomic;
pub use prep_requirements::JsonPrepRequirementRepository;
