pub mod fps;
pub mod logging;
pub mod tracing;
