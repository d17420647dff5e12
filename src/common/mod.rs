pub mod body;
pub mod data;
pub mod util;
