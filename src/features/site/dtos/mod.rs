mod site_dto;

pub use site_dto::*;
