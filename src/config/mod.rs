// Re-export all items from the submodules
mod collection_config;
mod workload_types;

// Re-export collection config
pub use collection_config::{
    CollectionConfig,
    CollectorOptions,
    DiscoveredResources,
};

// Re-export workload types
pub use workload_types::{
    CredentialStrategy,
    PodMatch,
    SummaryStrategy,
    WorkloadProfile,
    WorkloadType,
};
