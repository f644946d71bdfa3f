pub mod app_state;
pub mod completion_binding;
pub mod http;
