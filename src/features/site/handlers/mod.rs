mod site_handler;

pub use site_handler::*;
