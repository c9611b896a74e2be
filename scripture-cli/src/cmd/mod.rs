pub mod chapter;
pub mod info;
pub mod interactive;
pub mod search;
