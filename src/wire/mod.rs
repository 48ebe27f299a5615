//! Frontend wire protocol and stdio pumps

pub mod protocol;
pub mod pump;
