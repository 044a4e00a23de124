mod error;
mod event;
mod menu;
mod rpc;
mod session;
mod storage;

pub use error::*;
pub use event::*;
pub use menu::*;
pub use rpc::*;
pub use session::*;
pub use storage::*;
