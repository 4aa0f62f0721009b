//! dnsclient application layer
//!
//! Holds the [`ports::DnsClient`] capability every transport implements, the
//! message and record helpers in [`services`], and the resolution engine plus
//! everything layered on top of it in [`use_cases`].
pub mod ports;
pub mod services;
pub mod use_cases;
