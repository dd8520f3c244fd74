pub mod dependency_resolver;
pub mod field_tracker;
pub mod object_replicator;
