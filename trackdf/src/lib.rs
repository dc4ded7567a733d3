// src/lib.rs
pub mod data {
    pub mod hits;
    pub mod triplets;
}

pub mod pipeline {
    pub mod config;
    pub mod driver;
    pub mod summary;
}

pub mod error;
