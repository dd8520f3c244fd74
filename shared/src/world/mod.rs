pub mod dynamic_object;
pub mod error;
pub mod net_id_pool;
pub mod object_world;
pub mod relevancy;
pub mod replicate;
