pub mod mesher;
pub mod report;
pub mod runner;
pub mod scenes;
