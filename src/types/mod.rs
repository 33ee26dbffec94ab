//! Data types shared across the library.
//!
//! - Port kinds and attached IO types
//! - Mode values and calibration

pub mod port;
pub mod value;

pub use port::{IoType, PortKind};
pub use value::{DataType, ModeScale, ModeValue, Value};
