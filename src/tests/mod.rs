
pub mod field_tests;
pub mod crypto_tests;
pub mod extract_tests;
