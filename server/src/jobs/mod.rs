//! Radio jobs: precondition checks, launch and the write-through job record.

pub mod orchestrator;

pub use orchestrator::JobOrchestrator;
