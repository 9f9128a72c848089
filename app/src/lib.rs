//! ssrank: discover, probe and rank public Shadowsocks servers.
//! ssrank：发现、探测并排序公共 Shadowsocks 服务器。
//!
//! The binary is a thin shell over this library so configuration, logging and the command
//! implementations can be tested without spawning a process.

pub mod cli;
pub mod config;
pub mod logging;
pub mod runtime;
