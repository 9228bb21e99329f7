pub mod file_lifecycle;
pub mod stage_engine;

pub use file_lifecycle::FileLifecycle;
pub use stage_engine::StageEngine;
