mod debug_log;
#[cfg(test)]
pub mod fixtures;
mod menus;
mod session;
mod session_vault;

pub use debug_log::*;
pub use menus::*;
pub use session::*;
pub use session_vault::*;
