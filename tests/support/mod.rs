#![allow(dead_code)]

pub mod config_home;
pub mod csv;
