//! Static port capability blobs.
//!
//! Some peripherals built into a hub never answer port information requests,
//! so their capability messages are kept as precomputed constants: one
//! message per line, bytes written as dash-separated hex
//! (`0B-00-43-64-...`). The blobs decode with the regular codec.

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::codec::CodecRegistry;
use crate::protocol::message::{Message, ModeInfo};
use crate::types::ModeScale;

/// Capability messages of the Technic medium hub gesture sensor (port 0x64).
pub const TECHNIC_MEDIUM_HUB_GEST_SENSOR: &str = "
0B-00-43-64-01-02-01-01-00-00-00
05-00-43-64-02
11-00-44-64-00-00-47-45-53-54-00-00-00-00-00-00-00
0E-00-44-64-00-01-00-00-00-00-00-00-80-40
0E-00-44-64-00-02-00-00-00-00-00-00-C8-42
0E-00-44-64-00-03-00-00-00-00-00-00-80-40
0A-00-44-64-00-04-00-00-00-00
08-00-44-64-00-05-44-00
0A-00-44-64-00-80-01-00-01-00
";

/// Splits a blob into raw message buffers.
///
/// # Errors
///
/// Returns [`crate::Error::Hex`] if a line is not valid hex.
pub fn parse_blob(blob: &str) -> Result<Vec<Bytes>> {
    blob.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let bytes = hex::decode(line.replace('-', ""))?;
            Ok(Bytes::from(bytes))
        })
        .collect()
}

/// Parses and decodes every message of a blob.
///
/// # Errors
///
/// Returns the first hex, framing or decode error encountered.
pub fn decode_blob(blob: &str) -> Result<Vec<Message>> {
    let registry = CodecRegistry::global();
    parse_blob(blob)?
        .iter()
        .map(|data| registry.decode(data))
        .collect()
}

/// Collects the calibration of `(port_id, mode)` from decoded mode information.
///
/// Returns `None` unless raw, percentage and SI ranges are all present.
#[must_use]
pub fn mode_scale(messages: &[Message], port_id: u8, mode: u8) -> Option<ModeScale> {
    let mut raw = None;
    let mut pct = None;
    let mut si = None;

    for message in messages {
        let Message::PortModeInformation(info) = message else {
            continue;
        };
        if info.port_id != port_id || info.mode != mode {
            continue;
        }
        match info.info {
            ModeInfo::Raw { min, max } => raw = Some((f64::from(min), f64::from(max))),
            ModeInfo::Pct { min, max } => pct = Some((f64::from(min), f64::from(max))),
            ModeInfo::Si { min, max } => si = Some((f64::from(min), f64::from(max))),
            _ => {}
        }
    }

    Some(ModeScale {
        raw: raw?,
        pct: pct?,
        si: si?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::{PortCapabilities, PortInfo};
    use crate::types::DataType;

    #[test]
    fn test_parse_blob() {
        let frames = parse_blob(TECHNIC_MEDIUM_HUB_GEST_SENSOR).unwrap();
        assert_eq!(frames.len(), 9);
        assert_eq!(&frames[1][..], &[0x05, 0x00, 0x43, 0x64, 0x02]);
    }

    #[test]
    fn test_parse_blob_invalid_hex() {
        assert!(matches!(
            parse_blob("0B-ZZ"),
            Err(crate::Error::Hex(_))
        ));
    }

    #[test]
    fn test_decode_gesture_sensor_blob() {
        let messages = decode_blob(TECHNIC_MEDIUM_HUB_GEST_SENSOR).unwrap();
        assert_eq!(messages.len(), 9);

        let Message::PortInformation(info) = &messages[0] else {
            panic!("expected PortInformation");
        };
        assert_eq!(info.port_id, 0x64);
        let PortInfo::ModeInfo {
            capabilities,
            total_mode_count,
            input_modes,
            output_modes,
        } = info.info
        else {
            panic!("expected mode info");
        };
        assert!(capabilities.contains(PortCapabilities::INPUT));
        assert_eq!(total_mode_count, 1);
        assert_eq!(input_modes, 0x0001);
        assert_eq!(output_modes, 0x0000);

        let Message::PortModeInformation(name) = &messages[2] else {
            panic!("expected PortModeInformation");
        };
        assert_eq!(name.info, ModeInfo::Name("GEST".into()));

        let Message::PortModeInformation(format) = &messages[8] else {
            panic!("expected PortModeInformation");
        };
        assert_eq!(
            format.info,
            ModeInfo::ValueFormat {
                datasets: 1,
                data_type: DataType::I8,
                figures: 1,
                decimals: 0,
            }
        );
    }

    #[test]
    fn test_mode_scale_from_blob() {
        let messages = decode_blob(TECHNIC_MEDIUM_HUB_GEST_SENSOR).unwrap();
        let scale = mode_scale(&messages, 0x64, 0).unwrap();
        assert_eq!(scale.raw, (0.0, 4.0));
        assert_eq!(scale.pct, (0.0, 100.0));
        assert_eq!(scale.si, (0.0, 4.0));

        assert_eq!(mode_scale(&messages, 0x64, 1), None);
    }
}
