pub mod checkpoint;
pub mod commands;
pub mod error;
pub mod logging;
pub mod process;
pub mod recent;
pub mod settings;
pub mod supervisor;
pub mod worker;
