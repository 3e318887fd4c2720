pub mod pg_directory_test;
