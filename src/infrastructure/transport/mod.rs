pub mod connection;
pub mod rpc;

pub use connection::Connection;
pub use rpc::RpcClient;
