//! Test suite for the identity server and client session store
//!
//! This module organizes all tests

pub mod property;
