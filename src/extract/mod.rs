pub mod element_model;
pub mod extractor;
pub mod image_extractor;
pub mod url_extractor;
