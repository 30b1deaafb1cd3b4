//! Protocol engine for the Drcom client
//!
//! This crate owns the long-running side of the client:
//!
//! - `UdpTransport`: socket bound by probing a port range, receive with timeout
//! - `Machine`: the Challenge / Login / Keepalive state machine
//! - `Driver`: the outer loop that restarts sessions and logs out on shutdown
//! - `Cancellation`: cooperative shutdown flag shared with signal handlers
//!
//! # Example
//!
//! ```no_run
//! use std::net::{IpAddr, Ipv4Addr};
//! use drcom_client::{Cancellation, Driver, Tunables, UdpTransport};
//! use drcom_core::Session;
//!
//! # async fn example(session: Session) -> drcom_core::Result<()> {
//! let tunables = Tunables::default();
//! let transport = UdpTransport::bind(
//!     IpAddr::V4(Ipv4Addr::UNSPECIFIED),
//!     tunables.port_range.clone(),
//!     session.server_addr,
//!     tunables.recv_timeout,
//! )
//! .await?;
//!
//! let cancel = Cancellation::new();
//! let mut driver = Driver::new(session, transport, tunables, cancel);
//! let summary = driver.run().await?;
//! println!("logout acknowledged: {}", summary.logout_acknowledged);
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod driver;
pub mod machine;
pub mod transport;
pub mod tunables;

pub use cancel::Cancellation;
pub use driver::{Driver, RunSummary};
pub use machine::Machine;
pub use transport::{RecvOutcome, Transport, UdpTransport};
pub use tunables::Tunables;
