mod utils;

mod export_tests;
mod sqlite_store_tests;
