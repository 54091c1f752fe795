pub mod cmd;
pub mod utils;
