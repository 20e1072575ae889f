//! Wireless input boundary
//!
//! A [`WirelessDecoder`] normalizes one raw wireless report into the
//! canonical input state. The Bluetooth transport that produces the reports
//! lives outside this crate.

use super::button_id::{AxisId, ButtonId, HAT_TO_LD_BTNS, MAX_AXES};
use super::generic::{CtrlMeta, GenericCtrl};
use crate::error::AdapterError;
use tracing::trace;

/// Normalizes raw wireless reports
pub trait WirelessDecoder: Send + Sync {
    /// Overwrites `ctrl` with the content of `raw`
    ///
    /// On error `ctrl` must be considered garbage and the cycle abandoned.
    fn decode(&self, raw: &[u8], ctrl: &mut GenericCtrl) -> Result<(), AdapterError>;

    fn name(&self) -> &'static str;
}

/// Report id of the generic gamepad report
pub const GENERIC_REPORT_ID: u8 = 0x01;

/// Length of the generic gamepad report
pub const GENERIC_REPORT_LEN: usize = 18;

const STICK_META: CtrlMeta = CtrlMeta::new(-32768, 32767, 0, 32768);
const TRIGGER_META: CtrlMeta = CtrlMeta::new(0, 1023, 0, 1024);

static GENERIC_AXES_META: [CtrlMeta; MAX_AXES] = [
    STICK_META,
    STICK_META,
    STICK_META,
    STICK_META,
    TRIGGER_META,
    TRIGGER_META,
];

const GENERIC_MASK: [u32; 4] = [0xFFFF_FFFF, 0, 0, 0];
const GENERIC_DESC: [u32; 4] = [
    0x0000_00FF | ButtonId::LM.bit() | ButtonId::RM.bit(),
    0,
    0,
    0,
];

/// Decoder for the generic gamepad report
///
/// Layout, little endian:
///
/// ```text
/// [0]      report id (0x01)
/// [1..5]   plane-0 button bits (u32)
/// [5]      hat, 0 = up, clockwise, >= 8 centred
/// [6..14]  LX, LY, RX, RY (i16, up and right positive)
/// [14..18] LT, RT (u16, 0..1023)
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericHidDecoder;

impl GenericHidDecoder {
    fn read_i16(raw: &[u8], offset: usize) -> i32 {
        i16::from_le_bytes([raw[offset], raw[offset + 1]]) as i32
    }

    fn read_u16(raw: &[u8], offset: usize) -> i32 {
        u16::from_le_bytes([raw[offset], raw[offset + 1]]) as i32
    }
}

impl WirelessDecoder for GenericHidDecoder {
    fn decode(&self, raw: &[u8], ctrl: &mut GenericCtrl) -> Result<(), AdapterError> {
        if raw.len() < GENERIC_REPORT_LEN {
            return Err(AdapterError::UnsupportedReport(format!(
                "expected {} bytes, got {}",
                GENERIC_REPORT_LEN,
                raw.len()
            )));
        }
        if raw[0] != GENERIC_REPORT_ID {
            return Err(AdapterError::UnsupportedReport(format!(
                "unknown report id 0x{:02X}",
                raw[0]
            )));
        }

        ctrl.reset();
        ctrl.bind_masks(&GENERIC_MASK, &GENERIC_DESC);
        ctrl.bind_meta(&GENERIC_AXES_META);

        let btns = u32::from_le_bytes([raw[1], raw[2], raw[3], raw[4]]);
        let hat = HAT_TO_LD_BTNS[(raw[5] & 0x0F) as usize];
        // Axis endpoint bits never come from the button field
        ctrl.btns[0] = (btns & !GENERIC_DESC[0]) | hat;

        let values = [
            Self::read_i16(raw, 6),
            Self::read_i16(raw, 8),
            Self::read_i16(raw, 10),
            Self::read_i16(raw, 12),
            Self::read_u16(raw, 14).min(TRIGGER_META.size_max),
            Self::read_u16(raw, 16).min(TRIGGER_META.size_max),
        ];
        for (axis, value) in AxisId::ALL.iter().zip(values) {
            ctrl.axis_mut(*axis).value = value;
        }

        trace!(
            "Decoded generic report: btns={:08X} lx={} ly={} rx={} ry={} lt={} rt={}",
            ctrl.btns[0],
            values[0],
            values[1],
            values[2],
            values[3],
            values[4],
            values[5]
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "generic-hid"
    }
}

/// Builds a generic gamepad report
///
/// Used by the replay tool and tests to feed the decoder.
pub fn encode_generic_report(btns: u32, hat: u8, axes: [i16; 4], triggers: [u16; 2]) -> [u8; GENERIC_REPORT_LEN] {
    let mut raw = [0u8; GENERIC_REPORT_LEN];
    raw[0] = GENERIC_REPORT_ID;
    raw[1..5].copy_from_slice(&btns.to_le_bytes());
    raw[5] = hat;
    for (i, axis) in axes.iter().enumerate() {
        raw[6 + i * 2..8 + i * 2].copy_from_slice(&axis.to_le_bytes());
    }
    for (i, trigger) in triggers.iter().enumerate() {
        raw[14 + i * 2..16 + i * 2].copy_from_slice(&trigger.to_le_bytes());
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_and_foreign_reports() {
        let mut ctrl = GenericCtrl::new(0);
        let decoder = GenericHidDecoder;

        let short = decoder.decode(&[GENERIC_REPORT_ID, 0, 0], &mut ctrl);
        assert!(matches!(short, Err(AdapterError::UnsupportedReport(_))));

        let mut foreign = encode_generic_report(0, 8, [0; 4], [0; 2]);
        foreign[0] = 0x3F;
        let foreign = decoder.decode(&foreign, &mut ctrl);
        assert!(matches!(foreign, Err(AdapterError::UnsupportedReport(_))));
    }

    #[test]
    fn decodes_buttons_hat_and_axes() {
        let mut ctrl = GenericCtrl::new(0);
        let raw = encode_generic_report(ButtonId::RB_DOWN.bit(), 2, [100, -200, 0, 32767], [1023, 0]);

        GenericHidDecoder.decode(&raw, &mut ctrl).unwrap();

        assert!(ctrl.is_pressed(ButtonId::RB_DOWN));
        assert!(ctrl.is_pressed(ButtonId::LD_RIGHT));
        assert!(!ctrl.is_pressed(ButtonId::LD_UP));
        assert_eq!(ctrl.axis(AxisId::Lx).value, 100);
        assert_eq!(ctrl.axis(AxisId::Ly).value, -200);
        assert_eq!(ctrl.axis(AxisId::Ry).value, 32767);
        assert_eq!(ctrl.axis(AxisId::TrigL).value, 1023);
        assert!(ctrl.is_axis(ButtonId::LX_RIGHT));
        assert!(!ctrl.is_axis(ButtonId::RB_DOWN));
        assert_eq!(ctrl.axis(AxisId::Lx).abs_max(), 32768);
    }

    #[test]
    fn axis_bits_in_button_field_are_ignored() {
        let mut ctrl = GenericCtrl::new(0);
        let raw = encode_generic_report(ButtonId::LX_LEFT.bit() | ButtonId::LM.bit(), 8, [0; 4], [0; 2]);

        GenericHidDecoder.decode(&raw, &mut ctrl).unwrap();

        assert_eq!(ctrl.btns[0], 0);
    }
}
