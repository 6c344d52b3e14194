pub mod json_formatter;
pub mod not_found;
