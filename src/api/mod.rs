//! Demo HTTP API built on the dispatcher

pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
