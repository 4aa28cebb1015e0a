//! Configuration structures and types
pub mod compiler;
pub mod declaration;
pub mod paths;
pub mod pipeline;

// Re-export main config types
pub use compiler::{CompilerProfile, CompilerSettings, OptimizerSettings};
pub use declaration::ProjectDeclaration;
pub use paths::{ProjectPaths, TestSettings};
pub use pipeline::{
    CoverageSettings, GasReportSettings, PipelineToggle, ResolvedStage, SizeCheckSettings, Stage,
    StageConfig, StageParameters, StageSettings, VerifySettings,
};
