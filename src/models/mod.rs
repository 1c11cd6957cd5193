//! 数据模型模块

pub mod emotion;
pub mod language;
pub mod mental_state;
pub mod relationship;
pub mod session;
pub mod visitor;
