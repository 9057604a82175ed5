pub mod hosts;
pub mod report;
pub mod status;
pub mod up;
pub mod validate;
