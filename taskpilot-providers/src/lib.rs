pub mod gemini;
pub mod monday;
pub mod parse;
pub mod request;
pub mod runtime;
