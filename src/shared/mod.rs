pub mod constants;
#[cfg(test)]
pub mod test_helpers;
pub mod tree;
pub mod types;
pub mod validation;
