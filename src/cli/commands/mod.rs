//! One file per subcommand. Each handler validates its own arguments and reports its own errors.

mod check;
mod emit;
mod encode;

pub use check::cmd_check;
pub use emit::cmd_emit;
pub use encode::cmd_encode;
