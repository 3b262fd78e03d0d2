pub mod buffer;
pub mod utils;

pub use buffer::Buffer;
pub use utils::{display_width, truncate_to_width};
