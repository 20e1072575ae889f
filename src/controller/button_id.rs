//! Button and axis identity space
//!
//! Every logical input of the canonical controller is a [`ButtonId`] in
//! `0..128`, split into four planes of 32 bits. Stick and trigger axes own
//! endpoint ids (one per direction) so that an axis can be remapped onto a
//! button and back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of 32-bit button planes in a canonical state
pub const BTN_PLANES: usize = 4;

/// Number of logical analog axes in a canonical state
pub const MAX_AXES: usize = 6;

/// Logical input identifier, `0..128`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonId(pub u8);

impl ButtonId {
    // Left stick
    pub const LX_LEFT: ButtonId = ButtonId(0);
    pub const LX_RIGHT: ButtonId = ButtonId(1);
    pub const LY_DOWN: ButtonId = ButtonId(2);
    pub const LY_UP: ButtonId = ButtonId(3);
    // Right stick
    pub const RX_LEFT: ButtonId = ButtonId(4);
    pub const RX_RIGHT: ButtonId = ButtonId(5);
    pub const RY_DOWN: ButtonId = ButtonId(6);
    pub const RY_UP: ButtonId = ButtonId(7);
    // Left d-pad
    pub const LD_LEFT: ButtonId = ButtonId(8);
    pub const LD_RIGHT: ButtonId = ButtonId(9);
    pub const LD_DOWN: ButtonId = ButtonId(10);
    pub const LD_UP: ButtonId = ButtonId(11);
    // Right d-pad
    pub const RD_LEFT: ButtonId = ButtonId(12);
    pub const RD_RIGHT: ButtonId = ButtonId(13);
    pub const RD_DOWN: ButtonId = ButtonId(14);
    pub const RD_UP: ButtonId = ButtonId(15);
    // Face buttons
    pub const RB_LEFT: ButtonId = ButtonId(16);
    pub const RB_RIGHT: ButtonId = ButtonId(17);
    pub const RB_DOWN: ButtonId = ButtonId(18);
    pub const RB_UP: ButtonId = ButtonId(19);
    // Menu buttons
    pub const MM: ButtonId = ButtonId(20);
    pub const MS: ButtonId = ButtonId(21);
    pub const MT: ButtonId = ButtonId(22);
    pub const MQ: ButtonId = ButtonId(23);
    // Left shoulder: trigger, bumper, second bumper, stick click
    pub const LM: ButtonId = ButtonId(24);
    pub const LS: ButtonId = ButtonId(25);
    pub const LT: ButtonId = ButtonId(26);
    pub const LJ: ButtonId = ButtonId(27);
    // Right shoulder
    pub const RM: ButtonId = ButtonId(28);
    pub const RS: ButtonId = ButtonId(29);
    pub const RT: ButtonId = ButtonId(30);
    pub const RJ: ButtonId = ButtonId(31);
    // Relative pointing aliases of the left stick
    pub const MOUSE_WX_LEFT: ButtonId = ButtonId(32);
    pub const MOUSE_WX_RIGHT: ButtonId = ButtonId(33);
    pub const MOUSE_WY_DOWN: ButtonId = ButtonId(34);
    pub const MOUSE_WY_UP: ButtonId = ButtonId(35);

    /// Highest valid identifier
    pub const MAX: u8 = 127;

    /// Button plane holding this id
    #[inline]
    pub const fn plane(self) -> usize {
        ((self.0 & Self::MAX) >> 5) as usize
    }

    /// Bit of this id within its plane
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << (self.0 & 0x1F)
    }

    pub const fn is_valid(self) -> bool {
        self.0 <= Self::MAX
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "btn#{}", self.0)
    }
}

/// Logical analog axes of the canonical controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisId {
    Lx = 0,
    Ly = 1,
    Rx = 2,
    Ry = 3,
    TrigL = 4,
    TrigR = 5,
}

impl AxisId {
    pub const ALL: [AxisId; MAX_AXES] = [
        AxisId::Lx,
        AxisId::Ly,
        AxisId::Rx,
        AxisId::Ry,
        AxisId::TrigL,
        AxisId::TrigR,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Maps an id to the logical axis it is an endpoint of
pub fn axis_of(id: ButtonId) -> Option<AxisId> {
    match id {
        ButtonId::LX_LEFT | ButtonId::LX_RIGHT | ButtonId::MOUSE_WX_LEFT | ButtonId::MOUSE_WX_RIGHT => {
            Some(AxisId::Lx)
        }
        ButtonId::LY_DOWN | ButtonId::LY_UP | ButtonId::MOUSE_WY_DOWN | ButtonId::MOUSE_WY_UP => {
            Some(AxisId::Ly)
        }
        ButtonId::RX_LEFT | ButtonId::RX_RIGHT => Some(AxisId::Rx),
        ButtonId::RY_DOWN | ButtonId::RY_UP => Some(AxisId::Ry),
        ButtonId::LM => Some(AxisId::TrigL),
        ButtonId::RM => Some(AxisId::TrigR),
        _ => None,
    }
}

/// Conventional sign of an endpoint id, inverted when `polarity` is set
///
/// Ids without axis affinity are `+1`.
pub fn sign(polarity: bool, id: ButtonId) -> i32 {
    let conventional = match id {
        ButtonId::LX_LEFT
        | ButtonId::LY_DOWN
        | ButtonId::RX_LEFT
        | ButtonId::RY_DOWN
        | ButtonId::MOUSE_WX_LEFT
        | ButtonId::MOUSE_WY_DOWN => -1,
        ButtonId::LX_RIGHT
        | ButtonId::LY_UP
        | ButtonId::RX_RIGHT
        | ButtonId::RY_UP
        | ButtonId::LM
        | ButtonId::RM
        | ButtonId::MOUSE_WX_RIGHT
        | ButtonId::MOUSE_WY_UP => 1,
        _ => return 1,
    };
    if polarity {
        -conventional
    } else {
        conventional
    }
}

/// Plane-0 endpoint bits of an axis
///
/// Used to test whether a port's axis descriptor bits describe that axis.
pub const fn axis_to_endpoint_mask(axis: AxisId) -> u32 {
    match axis {
        AxisId::Lx => ButtonId::LX_LEFT.bit() | ButtonId::LX_RIGHT.bit(),
        AxisId::Ly => ButtonId::LY_DOWN.bit() | ButtonId::LY_UP.bit(),
        AxisId::Rx => ButtonId::RX_LEFT.bit() | ButtonId::RX_RIGHT.bit(),
        AxisId::Ry => ButtonId::RY_DOWN.bit() | ButtonId::RY_UP.bit(),
        AxisId::TrigL => ButtonId::LM.bit(),
        AxisId::TrigR => ButtonId::RM.bit(),
    }
}

/// Plane-1 relative pointing alias bits of an axis
pub const fn axis_alias_mask(axis: AxisId) -> u32 {
    match axis {
        AxisId::Lx => ButtonId::MOUSE_WX_LEFT.bit() | ButtonId::MOUSE_WX_RIGHT.bit(),
        AxisId::Ly => ButtonId::MOUSE_WY_DOWN.bit() | ButtonId::MOUSE_WY_UP.bit(),
        _ => 0,
    }
}

const fn bit(id: ButtonId) -> u32 {
    id.bit()
}

/// D-pad bits for each of the eight hat directions, clockwise from up
pub const HAT_TO_LD_BTNS: [u32; 16] = [
    bit(ButtonId::LD_UP),
    bit(ButtonId::LD_UP) | bit(ButtonId::LD_RIGHT),
    bit(ButtonId::LD_RIGHT),
    bit(ButtonId::LD_DOWN) | bit(ButtonId::LD_RIGHT),
    bit(ButtonId::LD_DOWN),
    bit(ButtonId::LD_DOWN) | bit(ButtonId::LD_LEFT),
    bit(ButtonId::LD_LEFT),
    bit(ButtonId::LD_UP) | bit(ButtonId::LD_LEFT),
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
];

/// Plane-0 generic bits in encoder walk order
pub const GENERIC_BTNS_MASK: [u32; 32] = {
    let mut table = [0u32; 32];
    let mut i = 0;
    while i < 32 {
        table[i] = 1 << i;
        i += 1;
    }
    table
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_and_bit_split_the_id_space() {
        assert_eq!(ButtonId(0).plane(), 0);
        assert_eq!(ButtonId(31).plane(), 0);
        assert_eq!(ButtonId(32).plane(), 1);
        assert_eq!(ButtonId(95).plane(), 2);
        assert_eq!(ButtonId(127).plane(), 3);
        assert_eq!(ButtonId(33).bit(), 0b10);
        assert_eq!(ButtonId::RJ.bit(), 1 << 31);
    }

    #[test]
    fn every_endpoint_belongs_to_one_axis() {
        for raw in 0..=ButtonId::MAX {
            let id = ButtonId(raw);
            if let Some(axis) = axis_of(id) {
                let in_plane0 = id.plane() == 0 && axis_to_endpoint_mask(axis) & id.bit() != 0;
                let in_alias = id.plane() == 1 && axis_alias_mask(axis) & id.bit() != 0;
                assert!(in_plane0 || in_alias, "{id} not in mask of {axis:?}");
            }
        }
        assert_eq!(axis_of(ButtonId::RB_DOWN), None);
        assert_eq!(axis_of(ButtonId::MOUSE_WY_UP), Some(AxisId::Ly));
    }

    #[test]
    fn sign_follows_polarity() {
        assert_eq!(sign(false, ButtonId::LX_RIGHT), 1);
        assert_eq!(sign(false, ButtonId::LX_LEFT), -1);
        assert_eq!(sign(true, ButtonId::LY_UP), -1);
        assert_eq!(sign(true, ButtonId::RY_DOWN), 1);
        assert_eq!(sign(false, ButtonId::RM), 1);
        assert_eq!(sign(true, ButtonId::RB_DOWN), 1);
    }

    #[test]
    fn hat_table_is_centred_past_eight() {
        assert_eq!(HAT_TO_LD_BTNS[0], ButtonId::LD_UP.bit());
        assert_eq!(
            HAT_TO_LD_BTNS[3],
            ButtonId::LD_DOWN.bit() | ButtonId::LD_RIGHT.bit()
        );
        assert!(HAT_TO_LD_BTNS[8..].iter().all(|b| *b == 0));
    }
}
