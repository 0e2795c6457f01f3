pub mod confirm;
pub mod executor;
pub mod matcher;
pub mod planner;
pub mod renamer;
