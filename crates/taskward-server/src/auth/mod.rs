pub mod bootstrap;
pub mod password;
