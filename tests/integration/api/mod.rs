pub mod auth_test;
pub mod cookie_test;
pub mod csrf_test;
