//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (JSON-RPC provider, local signer).
//!
//! Adapter categories:
//! - `chain`: Lending pool / token interaction via alloy-rs

pub mod chain;
