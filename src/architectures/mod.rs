//! Architecture-specific analysis and utilities.
//!
//! Only the 65C816 family is supported: its opcode catalogue, addressing
//! mode sizing, and register width tracking live in [`w65c816`].

pub mod w65c816;
