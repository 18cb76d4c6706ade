#![allow(dead_code)]

pub mod community_server;
