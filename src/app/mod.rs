// Application layer - Use case interactors

pub mod container;
pub mod convert_interactor;
pub mod inspect_interactor;
pub mod structure_replicator;

// Re-export interactors
pub use convert_interactor::{ConvertInteractor, ConvertOptions};
pub use inspect_interactor::{InspectFormat, InspectInteractor};
pub use structure_replicator::StructureReplicator;
