pub mod extraction;
pub mod graph;
pub mod llm;
pub mod planner;
