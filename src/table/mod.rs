pub mod parser;
pub mod table_model;
