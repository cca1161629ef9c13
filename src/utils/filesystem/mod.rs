pub mod atomic;

pub use atomic::{read_if_exists, write_atomic};
