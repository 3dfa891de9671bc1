//! Control-call plumbing for the WMT combo-chip driver.
//!
//! This is the lowest layer of wmtload:
//! - [`ControlCommand`] packs direction/type/number/size into a request number
//! - [`invoke`] issues a request and keeps the driver's overloaded return
//!   value intact as an [`IoctlResult`]
//! - [`CharDevice`] is the opened `/dev` node, [`SharedDevice`] serializes
//!   access when more than one worker holds the same handle

pub mod command;
pub mod device;
pub mod error;
pub mod shared;

#[cfg(unix)]
pub mod chardev;

pub use command::{encode, ControlCommand, Direction, SizeClass};
pub use device::{invoke, ControlDevice, IoctlArg, IoctlResult, RawReturn};
pub use error::{DeviceError, OsErrorCode, Result};
pub use shared::SharedDevice;

#[cfg(unix)]
pub use chardev::CharDevice;
