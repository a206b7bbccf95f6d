//! Integration tests for relaunch
//!
//! These drive the public API end to end: a worker writing checkpoints across
//! crashes, and a supervisor restarting a real worker process until its job is done.

pub mod crash_resume;
pub mod helpers;
pub mod supervision;
