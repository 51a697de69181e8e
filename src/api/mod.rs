//! REST API module
//!
//! Provides the HTTP surface of the coordination service.
//!
//! # Endpoints
//!
//! ## Multisig
//! - `POST /v1/multisig` - Create a multisig transaction
//! - `GET /v1/multisig/:alias?signature=&timestamp=` - List pending transactions
//! - `PUT /v1/multisig/:id` - Add an owner's signature
//! - `POST /v1/multisig/issue` - Issue a fully-signed transaction
//! - `POST /v1/multisig/cancel` - Cancel a pending transaction
//!
//! ## Service
//! - `GET /health` - Health check

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_router;
