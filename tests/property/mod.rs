pub mod reducer_proptest;
pub mod token_proptest;
