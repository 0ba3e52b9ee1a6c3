pub mod compilation;
pub mod compilation_event;
