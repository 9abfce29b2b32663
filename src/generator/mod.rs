pub mod retry;
pub mod test_case_generator;
