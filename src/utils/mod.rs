pub mod error;
pub mod format;
pub mod interactive;
pub mod output;
pub mod pagination;

pub use error::{AppError, AppResult};
pub use interactive::*;
pub use output::{OutputStyle, print_info, print_success, print_warning};
