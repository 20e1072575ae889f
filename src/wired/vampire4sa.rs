//! Vampire V4 Stand-Alone joystick/mouse port
//!
//! Pad mode packs two players into one 32-bit word, 16 bits per player:
//!
//! ```text
//! bit  15 14 13 12 11     10    9    8..1      0
//!      R  L  D  U  unused start back fire8..1  unused
//! ```
//!
//! Player 0 occupies bits 0..15 and player 1 bits 16..31 of the word kept
//! in port 0's buffer, which is what the console latches for either pad
//! port. Mouse mode keeps a button byte and two pointing accumulators in
//! the port's own buffer that the transmit path drains on every latch.

use super::{DeviceMode, Latch, WiredData, WiredDevice};
use crate::controller::button_id::{axis_to_endpoint_mask, AxisId, ButtonId, GENERIC_BTNS_MASK, MAX_AXES};
use crate::controller::generic::{CtrlMeta, GenericCtrl};
use tracing::trace;

/// Latch command for the joystick word
pub const CMD_JOY: u8 = 0x60;
/// Latch command for the mouse report
pub const CMD_MOUSE: u8 = 0x68;
/// Mouse report id
pub const MOUSE_ID: u8 = 0xD0;

const PLAYERS: usize = 2;
const PLAYER_BITS: u32 = 16;

/// Port whose buffer holds the shared joystick word
const JOY_PORT: usize = 0;
/// Output word of the joystick image
const JOY_WORD: usize = 0;
/// Output word holding the mouse header (buttons, id)
const MOUSE_WORD: usize = 1;

const PAD_MASK: [u32; 4] = [0x333F_0F00, 0, 0, 0];
const PAD_DESC: [u32; 4] = [0, 0, 0, 0];
const MOUSE_MASK: [u32; 4] = [0x1100_00F0, 0, 0, 0];
const MOUSE_DESC: [u32; 4] = [0x0000_00F0, 0, 0, 0];

const MOUSE_AXIS_META: CtrlMeta = CtrlMeta::new(-128, 127, 0, 128);

static MOUSE_AXES_META: [CtrlMeta; MAX_AXES] = [
    MOUSE_AXIS_META,
    MOUSE_AXIS_META.with_polarity(),
    MOUSE_AXIS_META,
    MOUSE_AXIS_META.with_polarity(),
    MOUSE_AXIS_META,
    MOUSE_AXIS_META,
];

/// Mouse accumulator fed by each canonical axis
const MOUSE_AXES_IDX: [usize; MAX_AXES] = [1, 0, 1, 0, 1, 0];

/// Joystick lines of one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoyState {
    /// fire1 in bit 0 through fire8 in bit 7
    pub fire: u8,
    pub back: bool,
    pub start: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl JoyState {
    const FIRE_SHIFT: u32 = 1;
    const BACK: u32 = 9;
    const START: u32 = 10;
    const UP: u32 = 12;
    const DOWN: u32 = 13;
    const LEFT: u32 = 14;
    const RIGHT: u32 = 15;

    pub fn pack(&self) -> u16 {
        let mut bits = (self.fire as u32) << Self::FIRE_SHIFT;
        for (set, pos) in [
            (self.back, Self::BACK),
            (self.start, Self::START),
            (self.up, Self::UP),
            (self.down, Self::DOWN),
            (self.left, Self::LEFT),
            (self.right, Self::RIGHT),
        ] {
            if set {
                bits |= 1 << pos;
            }
        }
        bits as u16
    }

    pub fn unpack(bits: u16) -> Self {
        let bits = bits as u32;
        let line = |pos: u32| bits & (1 << pos) != 0;
        Self {
            fire: (bits >> Self::FIRE_SHIFT) as u8,
            back: line(Self::BACK),
            start: line(Self::START),
            up: line(Self::UP),
            down: line(Self::DOWN),
            left: line(Self::LEFT),
            right: line(Self::RIGHT),
        }
    }
}

/// Packs both players into the joystick word
pub fn pack_joy_word(players: &[JoyState; PLAYERS]) -> u32 {
    players[0].pack() as u32 | (players[1].pack() as u32) << PLAYER_BITS
}

pub fn unpack_joy_word(word: u32) -> [JoyState; PLAYERS] {
    [
        JoyState::unpack(word as u16),
        JoyState::unpack((word >> PLAYER_BITS) as u16),
    ]
}

/// Single-player line driven by a generic plane-0 id, if any
fn pad_line(id: ButtonId) -> Option<JoyState> {
    let fire = |n: u8| JoyState {
        fire: 1 << (n - 1),
        ..Default::default()
    };
    let state = match id {
        ButtonId::LD_LEFT => JoyState { left: true, ..Default::default() },
        ButtonId::LD_RIGHT => JoyState { right: true, ..Default::default() },
        ButtonId::LD_DOWN => JoyState { down: true, ..Default::default() },
        ButtonId::LD_UP => JoyState { up: true, ..Default::default() },
        ButtonId::RB_LEFT => fire(3),
        ButtonId::RB_RIGHT => fire(2),
        ButtonId::RB_DOWN => fire(1),
        ButtonId::RB_UP => fire(4),
        ButtonId::MM => JoyState { start: true, ..Default::default() },
        ButtonId::MS => JoyState { back: true, ..Default::default() },
        ButtonId::LM => fire(5),
        ButtonId::LS => fire(6),
        ButtonId::RM => fire(7),
        ButtonId::RS => fire(8),
        _ => return None,
    };
    Some(state)
}

/// Mouse button bit driven by a generic plane-0 id, if any
fn mouse_button(id: ButtonId) -> Option<u8> {
    match id {
        ButtonId::LM => Some(1 << 1),
        ButtonId::RM => Some(1 << 2),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Vampire4Sa;

impl Vampire4Sa {
    fn encode_pad(ctrl: &GenericCtrl, buffers: &[WiredData]) {
        let player = ctrl.index as usize;
        if player >= PLAYERS {
            return;
        }
        let Some(data) = buffers.get(JOY_PORT) else {
            return;
        };

        let shift = PLAYER_BITS * player as u32;
        let mut set = 0u32;
        let mut clear = 0u32;
        for (i, generic) in GENERIC_BTNS_MASK.iter().enumerate() {
            if !ctrl.touched_any(1 << i) {
                continue;
            }
            let Some(line) = pad_line(ButtonId(i as u8)) else {
                continue;
            };
            let bits = (line.pack() as u32) << shift;
            if ctrl.btns[0] & generic != 0 {
                set |= bits;
            } else {
                clear |= bits;
            }
        }

        let word = data.update_word(JOY_WORD, set, clear);
        trace!("Vampire pad port {} word {:08X}", player, word);
    }

    fn encode_mouse(ctrl: &GenericCtrl, buffers: &[WiredData]) {
        let Some(data) = buffers.get(ctrl.index as usize) else {
            return;
        };
        let mut set = 0u32;
        let mut clear = 0u32;
        for (i, generic) in GENERIC_BTNS_MASK.iter().enumerate() {
            if !ctrl.touched_any(1 << i) {
                continue;
            }
            let Some(bit) = mouse_button(ButtonId(i as u8)) else {
                continue;
            };
            if ctrl.btns[0] & generic != 0 {
                set |= bit as u32;
            } else {
                clear |= bit as u32;
            }
        }
        data.update_word(MOUSE_WORD, set, clear);

        for axis in [AxisId::Rx, AxisId::Ry] {
            if !ctrl.touched_any(axis_to_endpoint_mask(axis) & MOUSE_DESC[0]) {
                continue;
            }
            let state = ctrl.axis(axis);
            let acc = data.accumulator(MOUSE_AXES_IDX[axis.index()]);
            if state.relative {
                acc.add(state.value);
            } else {
                acc.set(state.value);
            }
        }
    }
}

impl WiredDevice for Vampire4Sa {
    fn name(&self) -> &'static str {
        "vampire4sa"
    }

    fn meta_init(&self, modes: &[DeviceMode], outputs: &mut [GenericCtrl]) {
        for (i, ctrl) in outputs.iter_mut().enumerate() {
            ctrl.reset();
            ctrl.index = i as u8;
            match modes.get(i).copied().unwrap_or_default() {
                DeviceMode::Mouse => {
                    ctrl.bind_masks(&MOUSE_MASK, &MOUSE_DESC);
                    ctrl.bind_meta(&MOUSE_AXES_META);
                }
                DeviceMode::Pad => ctrl.bind_masks(&PAD_MASK, &PAD_DESC),
                DeviceMode::PadAlt | DeviceMode::Keyboard => {}
            }
        }
    }

    fn init_buffer(&self, mode: DeviceMode, data: &WiredData) {
        data.store_word(JOY_WORD, 0);
        if mode == DeviceMode::Mouse {
            data.store_word(MOUSE_WORD, (MOUSE_ID as u32) << 8);
            for idx in 0..2 {
                data.accumulator(idx).reset(true);
            }
        }
    }

    fn encode(&self, mode: DeviceMode, ctrl: &GenericCtrl, buffers: &[WiredData]) {
        match mode {
            DeviceMode::Mouse => Self::encode_mouse(ctrl, buffers),
            DeviceMode::Pad => Self::encode_pad(ctrl, buffers),
            DeviceMode::PadAlt | DeviceMode::Keyboard => {}
        }
    }

    /// Both pad ports latch the shared word; relative mouse axes are
    /// drained by this call
    fn latch(&self, port: u8, mode: DeviceMode, buffers: &[WiredData]) -> Option<Latch> {
        match mode {
            DeviceMode::Pad => Some(Latch {
                cmd: CMD_JOY,
                payload: buffers.get(JOY_PORT)?.word(JOY_WORD),
            }),
            DeviceMode::Mouse => {
                let data = buffers.get(port as usize)?;
                let header = data.word(MOUSE_WORD);
                let x = data.accumulator(0).take_i8() as u8;
                let y = data.accumulator(1).take_i8() as u8;
                Some(Latch {
                    cmd: CMD_MOUSE,
                    payload: u32::from_be_bytes([x, y, header as u8, (header >> 8) as u8]),
                })
            }
            DeviceMode::PadAlt | DeviceMode::Keyboard => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wired::wired_buffers;

    #[test]
    fn joy_state_packs_named_lines() {
        let state = JoyState {
            fire: 0b0000_0101,
            start: true,
            right: true,
            ..Default::default()
        };
        let bits = state.pack();

        assert_eq!(bits, (0b101 << 1) | (1 << 10) | (1 << 15));
        assert_eq!(JoyState::unpack(bits), state);
    }

    #[test]
    fn players_use_separate_halves() {
        let p0 = JoyState { up: true, ..Default::default() };
        let p1 = JoyState { fire: 1, ..Default::default() };
        let word = pack_joy_word(&[p0, p1]);

        assert_eq!(word, (1 << 12) | (1 << 17));
        assert_eq!(unpack_joy_word(word), [p0, p1]);
    }

    #[test]
    fn meta_init_binds_per_mode() {
        let mut outputs = [GenericCtrl::new(0); 3];
        outputs[0].press(ButtonId::MM);
        let modes = [DeviceMode::Pad, DeviceMode::Mouse, DeviceMode::Keyboard];

        Vampire4Sa.meta_init(&modes, &mut outputs);

        assert_eq!(outputs[0].btns, [0; 4]);
        assert_eq!(outputs[0].mask, PAD_MASK);
        assert!(outputs[0].axis(AxisId::Rx).meta.is_none());
        assert_eq!(outputs[1].desc, MOUSE_DESC);
        assert!(outputs[1].axis(AxisId::Ry).meta.is_some_and(|m| m.polarity));
        assert_eq!(outputs[2].mask, [0; 4]);
        assert_eq!(outputs[2].index, 2);
    }

    #[test]
    fn pad_encode_is_a_delta_update() {
        let buffers = wired_buffers(2);
        let mut ctrl = GenericCtrl::new(0);
        ctrl.bind_masks(&PAD_MASK, &PAD_DESC);
        ctrl.press(ButtonId::RB_DOWN);
        ctrl.touch(ButtonId::RB_DOWN);
        ctrl.touch(ButtonId::MM);

        buffers[0].store_word(JOY_WORD, 1 << 10 | 1 << 12);
        Vampire4Sa.encode(DeviceMode::Pad, &ctrl, &buffers);

        // fire1 set, start cleared, untouched up kept
        assert_eq!(buffers[0].word(JOY_WORD), 1 << 1 | 1 << 12);
    }

    #[test]
    fn second_player_lands_in_high_half_of_shared_word() {
        let buffers = wired_buffers(2);
        let mut p0 = GenericCtrl::new(0);
        p0.bind_masks(&PAD_MASK, &PAD_DESC);
        p0.press(ButtonId::RB_DOWN);
        p0.touch(ButtonId::RB_DOWN);
        let mut p1 = GenericCtrl::new(1);
        p1.bind_masks(&PAD_MASK, &PAD_DESC);
        p1.press(ButtonId::LD_LEFT);
        p1.touch(ButtonId::LD_LEFT);

        Vampire4Sa.encode(DeviceMode::Pad, &p0, &buffers);
        Vampire4Sa.encode(DeviceMode::Pad, &p1, &buffers);

        let word = 1 << 1 | 1 << (16 + 14);
        assert_eq!(buffers[0].word(JOY_WORD), word);
        assert_eq!(buffers[1].word(JOY_WORD), 0);
        for port in 0..2 {
            let latch = Vampire4Sa.latch(port, DeviceMode::Pad, &buffers);
            assert_eq!(latch, Some(Latch { cmd: CMD_JOY, payload: word }));
        }
    }

    #[test]
    fn third_player_is_not_encoded() {
        let buffers = wired_buffers(3);
        let mut ctrl = GenericCtrl::new(2);
        ctrl.bind_masks(&PAD_MASK, &PAD_DESC);
        ctrl.press(ButtonId::MM);
        ctrl.touch(ButtonId::MM);

        Vampire4Sa.encode(DeviceMode::Pad, &ctrl, &buffers);

        assert!(buffers.iter().all(|data| data.word(JOY_WORD) == 0));
    }

    #[test]
    fn mouse_latch_drains_relative_axes() {
        let buffers = wired_buffers(2);
        Vampire4Sa.init_buffer(DeviceMode::Mouse, &buffers[1]);
        let mut ctrl = GenericCtrl::new(1);
        ctrl.bind_masks(&MOUSE_MASK, &MOUSE_DESC);
        ctrl.bind_meta(&MOUSE_AXES_META);
        ctrl.axis_mut(AxisId::Rx).value = 100;
        ctrl.axis_mut(AxisId::Rx).relative = true;
        ctrl.touch(ButtonId::RX_RIGHT);
        ctrl.press(ButtonId::LM);
        ctrl.touch(ButtonId::LM);

        Vampire4Sa.encode(DeviceMode::Mouse, &ctrl, &buffers);
        Vampire4Sa.encode(DeviceMode::Mouse, &ctrl, &buffers);

        let latch = Vampire4Sa.latch(1, DeviceMode::Mouse, &buffers);
        assert_eq!(
            latch,
            Some(Latch {
                cmd: CMD_MOUSE,
                payload: u32::from_be_bytes([0, 127, 1 << 1, MOUSE_ID]),
            })
        );
        let again = Vampire4Sa.latch(1, DeviceMode::Mouse, &buffers).map(|l| l.payload);
        assert_eq!(again, Some(u32::from_be_bytes([0, 0, 1 << 1, MOUSE_ID])));
    }
}
