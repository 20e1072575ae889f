//! Mapping engine
//!
//! Applies the remap table of one wireless source to the canonical input
//! state and stages the result into the canonical output state of every
//! referenced wired port.
//!
//! # Cycle
//!
//! ```text
//! meta init (wired side) ──► run_mapping_cycle ──► encode each port in PortMask
//! ```
//!
//! The cycle is synchronous, never allocates and always runs to completion.
//!
//! # Conflict resolution
//!
//! - Axis destinations keep the largest magnitude staged this cycle, so rule
//!   order never decides the final axis value.
//! - Button destinations are OR-ed, a losing rule never clears a bit.
//! - Every supported destination a rule points at is marked touched, even
//!   when its value stays released or neutral.

use crate::controller::button_id::{axis_of, sign, ButtonId};
use crate::controller::generic::{CtrlMeta, GenericCtrl};
use crate::mapping::rule::{Algorithm, MapRule, PortMask};
use tracing::trace;

/// Runs one mapping cycle and returns the ports that need encoding
///
/// Output states must have been reset and bound by the wired side's meta
/// init beforehand.
pub fn run_mapping_cycle(input: &GenericCtrl, table: &[MapRule], outputs: &mut [GenericCtrl]) -> PortMask {
    let mut out_mask = PortMask::EMPTY;

    for rule in table {
        if !input.is_supported(rule.src_btn) {
            trace!("Rule {} -> {} ignored: source unsupported", rule.src_btn, rule.dst_btn);
            continue;
        }
        let Some(out) = outputs.get_mut(rule.dst_id as usize) else {
            trace!("Rule {} -> {} ignored: no port {}", rule.src_btn, rule.dst_btn, rule.dst_id);
            continue;
        };

        let updated = if input.is_axis(rule.src_btn) {
            map_from_axis(input, rule, out)
        } else {
            map_from_btn(input, rule, out)
        };

        if updated {
            out_mask.insert(rule.dst_id);
        }
    }

    out_mask
}

/// Stages `value` unless a larger magnitude is already staged
#[inline]
fn stage_axis(staged: &mut i32, value: i32) {
    if value.saturating_abs() > staged.saturating_abs() {
        *staged = value;
    }
}

fn map_from_axis(input: &GenericCtrl, rule: &MapRule, out: &mut GenericCtrl) -> bool {
    let src = rule.src_btn;
    let dst = rule.dst_btn;

    let Some(src_axis) = axis_of(src) else {
        trace!("Rule {} -> {} ignored: source has no axis", src, dst);
        return false;
    };
    let src_state = input.axis(src_axis);
    let Some(src_meta) = src_state.meta else {
        trace!("Rule {} -> {} ignored: source axis uncalibrated", src, dst);
        return false;
    };

    if !out.is_supported(dst) {
        trace!("Rule {} -> {} ignored: destination unsupported on port {}", src, dst, out.index);
        return true;
    }

    let src_value = src_state.value;
    let abs_src_value = src_value.saturating_abs();

    // A rule bound to one endpoint only follows its half of the axis
    if sign(src_meta.polarity, src) * src_value >= 0 {
        if out.is_axis(dst) {
            axis_to_axis(rule, src_meta, abs_src_value, out);
        } else {
            let threshold = (rule.perc_threshold as f32 / 100.0 * src_meta.abs_max as f32) as i32;
            if abs_src_value > threshold {
                out.press(dst);
            }
        }
    }

    out.touch(dst);
    true
}

fn axis_to_axis(rule: &MapRule, src_meta: &CtrlMeta, abs_src_value: i32, out: &mut GenericCtrl) {
    let dst = rule.dst_btn;
    let Some(dst_axis) = axis_of(dst) else {
        trace!("Rule {} -> {} ignored: destination has no axis", rule.src_btn, dst);
        return;
    };
    let dst_state = out.axis_mut(dst_axis);
    let Some(dst_meta) = dst_state.meta else {
        trace!("Rule {} -> {} ignored: destination axis uncalibrated", rule.src_btn, dst);
        return;
    };

    dst_state.relative = src_meta.relative;

    let deadzone =
        (rule.perc_deadzone as f32 / 100.0 * src_meta.abs_max as f32) as i32 + src_meta.deadzone;
    if abs_src_value <= deadzone {
        return;
    }

    let remainder = abs_src_value - deadzone;
    let dst_sign = sign(dst_meta.polarity, dst);
    let perc_max = rule.perc_max as f32 / 100.0;
    let scale = match rule.algo {
        Algorithm::Linear => {
            dst_meta.abs_max as f32 / (src_meta.abs_max - deadzone).max(1) as f32 * perc_max
        }
        Algorithm::Passthrough => perc_max,
    };
    let value = (dst_sign as f32 * remainder as f32 * scale) as i32;

    stage_axis(&mut dst_state.value, value);
}

fn map_from_btn(input: &GenericCtrl, rule: &MapRule, out: &mut GenericCtrl) -> bool {
    let src = rule.src_btn;
    let dst = rule.dst_btn;

    if !out.is_supported(dst) {
        trace!("Rule {} -> {} ignored: destination unsupported on port {}", src, dst, out.index);
        return true;
    }

    if input.is_pressed(src) {
        if out.is_axis(dst) {
            let Some(value) = full_scale(rule, dst, out) else {
                trace!("Rule {} -> {} ignored: destination axis unusable", src, dst);
                return false;
            };
            if let Some(axis) = axis_of(dst) {
                stage_axis(&mut out.axis_mut(axis).value, value);
            }
        } else {
            out.press(dst);
        }
    }

    out.touch(dst);
    true
}

/// Value a pressed button drives an axis endpoint to
fn full_scale(rule: &MapRule, dst: ButtonId, out: &GenericCtrl) -> Option<i32> {
    let meta = out.axis(axis_of(dst)?).meta?;
    let value = meta.abs_max as f32 * sign(meta.polarity, dst) as f32 * (rule.perc_max as f32 / 100.0);
    Some(value as i32)
}
