pub mod input;
pub mod overlay;
pub mod time_fmt;
