//! Local network discovery and capture analysis for the Drcom client
//!
//! ## Features
//!
//! - **Interface Management**: list interfaces and pick the local IPv4 and MAC
//!   written into login packets (`NetworkInfo`)
//! - **Capture Analysis**: recover the gateway-specific constants from a
//!   capture of an official client logging in
//!
//! ## Example
//!
//! ```no_run
//! use drcom_capture::{InterfaceNetworkInfo, NetworkInfo};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = InterfaceNetworkInfo::new(Some("eth0".to_string()));
//! println!("{} {}", provider.local_ipv4()?, provider.local_mac()?);
//! # Ok(())
//! # }
//! ```

pub mod analyse;
pub mod interface;

// Re-export main types
pub use analyse::{analyse_bytes, analyse_file, CaptureAnalysis};
pub use interface::{
    default_interface, get_interface, list_interfaces, InterfaceInfo, InterfaceNetworkInfo,
    NetworkInfo,
};
