
mod extraction_tests;
