pub mod builder;
pub mod handler;
pub mod listener;

pub use builder::ServerBuilder;
pub use handler::{exit_code_from_query, RequestHandler, EXIT_FLUSH_GRACE};
