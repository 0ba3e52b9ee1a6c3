pub mod event;
pub mod mark;
pub mod request;
