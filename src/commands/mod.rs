pub mod recent;
pub mod resume_point;
pub mod run;
