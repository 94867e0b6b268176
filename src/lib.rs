//! Host-side provisioning for the distillery controller.
//!
//! Registers a device with the hawkBit management server, renders its
//! configuration record and writes it into the `dev_config` NVS partition
//! over the attached serial port. Everything here runs on the bench
//! machine, not on the device.

pub mod record;
pub mod registration;
pub mod settings;
pub mod tools;
pub mod version;
