//! 基础设施层
//!
//! 只提供执行能力，不认识记录或路线

pub mod worker;

pub use worker::run_bounded;
