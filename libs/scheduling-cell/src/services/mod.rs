pub mod conflict;
pub mod lifecycle;
pub mod scheduling;
pub mod slots;
