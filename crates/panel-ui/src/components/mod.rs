//! Line-producing building blocks of the panel.

pub mod header;
pub mod profile_list;
pub mod usage_meter;
