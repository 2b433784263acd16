//! REST service exposing the safegate safety gateway.

pub mod handlers;
pub mod model;
pub mod router;
pub mod settings;
pub mod state;
