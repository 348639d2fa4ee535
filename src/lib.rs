pub mod board_file;
pub mod commands;
pub mod util;
