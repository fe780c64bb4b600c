//! Command implementations.

mod cat;
mod info;
mod replay;
mod table;
mod validate;

pub use cat::run_cat;
pub use info::run_info;
pub use replay::run_replay;
pub use table::run_table;
pub use validate::run_validate;
