pub mod config;
pub mod executor;

pub use config::Config;
pub use executor::{
    Disposition, Engine, EngineError, ErrorPreference, ExecutionRequest, ScriptRunner,
    ShellRunner, Target, TargetType,
};
