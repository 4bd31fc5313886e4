#![warn(missing_docs)]

//! Contour gRPC Service Layer
//!
//! Exposes the baseline user table as `user.v1.UserService`:
//! - GetUser: one user by id, NOT_FOUND when absent
//! - CreateUser: validate, insert and return the stored user
//! - ListUsers: every user in insertion order with a total count

// Include generated protobuf code
pub mod proto {
    //! Generated protobuf types and service definitions
    tonic::include_proto!("user.v1");
}

pub mod conversions;
pub mod server;
pub mod service;

pub use server::{start_server, ServeError, ServerConfig};
pub use service::UserServiceImpl;
