pub mod error;
pub mod rpc_router;
pub mod rpc_spec;
