//! Default GPIO assignments for the coop door board (BCM numbering).
//!
//! Single source of truth for the defaults; every pin can be overridden
//! from the command line.

// ---------------------------------------------------------------------------
// Stepper driver (ULN2003 board driving a 28BYJ-48)
// ---------------------------------------------------------------------------

/// Driver board inputs in1..in4, in that order.
/// Physical header pins 11, 15, 16, 18.
pub const DRIVER_PINS: [u8; 4] = [17, 22, 23, 24];

// ---------------------------------------------------------------------------
// Photoresistor RC circuit
// ---------------------------------------------------------------------------

/// Output: charges the capacitor through the photoresistor.
pub const CHARGING_PIN: u8 = 25;
/// Input: goes HIGH once the capacitor has charged.
pub const READING_PIN: u8 = 26;

/// Highest BCM pin number exposed on the 40-pin header.
pub const MAX_BCM_PIN: u8 = 27;
