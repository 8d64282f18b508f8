//! Resource structure analysis: what the container declares, what its content
//! reaches, and what is left over

pub mod orphans;
pub mod reachability;
pub mod reference_graph;

pub use orphans::{Orphan, OrphanCalculator, OrphanSets};
pub use reachability::{close_styles, ReachabilityAnalyzer, UsedResources, MAX_CLOSURE_ROUNDS};
pub use reference_graph::ReferenceGraph;
