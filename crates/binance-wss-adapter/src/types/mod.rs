/*
[INPUT]:  Kline stream schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for stream communication
[UPDATE]: When stream schema changes or new types added
*/

pub mod models;

pub use models::*;
