pub mod config_writer;
pub mod env_writer;
pub mod launcher;
pub mod validator;
