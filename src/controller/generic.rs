//! Canonical controller state shared by wireless decoders, the mapping
//! engine and wired encoders.

use super::button_id::{AxisId, ButtonId, BTN_PLANES, MAX_AXES};

/// Calibration metadata of one axis for one device mode
///
/// Always referenced as `&'static`; tables are defined once per wired
/// device mode or wireless decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CtrlMeta {
    pub size_min: i32,
    pub size_max: i32,
    pub neutral: i32,
    pub abs_max: i32,
    pub deadzone: i32,
    pub polarity: bool,
    pub relative: bool,
}

impl CtrlMeta {
    pub const fn new(size_min: i32, size_max: i32, neutral: i32, abs_max: i32) -> Self {
        Self {
            size_min,
            size_max,
            neutral,
            abs_max,
            deadzone: 0,
            polarity: false,
            relative: false,
        }
    }

    pub const fn with_deadzone(mut self, deadzone: i32) -> Self {
        self.deadzone = deadzone;
        self
    }

    pub const fn with_polarity(mut self) -> Self {
        self.polarity = true;
        self
    }

    pub const fn with_relative(mut self) -> Self {
        self.relative = true;
        self
    }
}

/// One analog axis slot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisState {
    /// Signed value relative to neutral
    pub value: i32,
    /// Whether the value is a pointing-device delta
    pub relative: bool,
    pub meta: Option<&'static CtrlMeta>,
}

impl AxisState {
    pub fn abs_max(&self) -> i32 {
        self.meta.map(|m| m.abs_max).unwrap_or(0)
    }
}

/// Canonical controller state
///
/// One instance per wireless source (input) and one per wired port
/// (output). `map_mask` is the per-cycle touched mask of an output state and
/// is always a subset of `mask`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenericCtrl {
    /// Wired port this state belongs to
    pub index: u8,
    /// Pressed bits
    pub btns: [u32; BTN_PLANES],
    /// Supported bits
    pub mask: [u32; BTN_PLANES],
    /// Supported bits that are axis endpoints
    pub desc: [u32; BTN_PLANES],
    /// Bits written by the mapping engine this cycle
    pub map_mask: [u32; BTN_PLANES],
    pub axes: [AxisState; MAX_AXES],
}

impl GenericCtrl {
    pub const fn new(index: u8) -> Self {
        Self {
            index,
            btns: [0; BTN_PLANES],
            mask: [0; BTN_PLANES],
            desc: [0; BTN_PLANES],
            map_mask: [0; BTN_PLANES],
            axes: [AxisState {
                value: 0,
                relative: false,
                meta: None,
            }; MAX_AXES],
        }
    }

    /// Clears every value, mask and meta binding, keeping the port index
    pub fn reset(&mut self) {
        *self = Self::new(self.index);
    }

    /// Binds supported and descriptor masks
    pub fn bind_masks(&mut self, mask: &[u32; BTN_PLANES], desc: &[u32; BTN_PLANES]) {
        self.mask = *mask;
        self.desc = *desc;
    }

    /// Binds one calibration table entry per axis
    pub fn bind_meta(&mut self, metas: &'static [CtrlMeta; MAX_AXES]) {
        for (axis, meta) in self.axes.iter_mut().zip(metas.iter()) {
            axis.meta = Some(meta);
        }
    }

    #[inline]
    pub fn is_supported(&self, id: ButtonId) -> bool {
        self.mask[id.plane()] & id.bit() != 0
    }

    #[inline]
    pub fn is_axis(&self, id: ButtonId) -> bool {
        self.desc[id.plane()] & id.bit() != 0
    }

    #[inline]
    pub fn is_pressed(&self, id: ButtonId) -> bool {
        self.btns[id.plane()] & id.bit() != 0
    }

    #[inline]
    pub fn is_touched(&self, id: ButtonId) -> bool {
        self.map_mask[id.plane()] & id.bit() != 0
    }

    #[inline]
    pub fn press(&mut self, id: ButtonId) {
        self.btns[id.plane()] |= id.bit();
    }

    /// Marks a bit as written this cycle, only if supported
    #[inline]
    pub fn touch(&mut self, id: ButtonId) {
        self.map_mask[id.plane()] |= id.bit() & self.mask[id.plane()];
    }

    #[inline]
    pub fn axis(&self, axis: AxisId) -> &AxisState {
        &self.axes[axis.index()]
    }

    #[inline]
    pub fn axis_mut(&mut self, axis: AxisId) -> &mut AxisState {
        &mut self.axes[axis.index()]
    }

    /// Whether any touched bit of plane 0 matches `bits`
    #[inline]
    pub fn touched_any(&self, bits: u32) -> bool {
        self.map_mask[0] & bits != 0
    }
}
