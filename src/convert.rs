//! Sample conversion into the canonical 32-bit integer form.
//!
//! 16-bit samples are sign-extended and 32-bit samples copied. 32-bit
//! floats saturate at the `i32` bounds and otherwise truncate toward zero.

use crate::packet::Samples;

/// Result of converting one packet's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Conversion {
    /// Samples written to the destination.
    pub written: usize,
    /// Floating samples that were saturated (or were NaN).
    pub clipped: usize,
}

/// Convert `samples` into the front of `dest`.
///
/// `dest` must hold at least `samples.len()` values; the caller is
/// responsible for the capacity check.
pub fn convert_into(samples: &Samples, dest: &mut [i32]) -> Conversion {
    debug_assert!(dest.len() >= samples.len());
    match samples {
        Samples::Int16(v) => {
            for (slot, &s) in dest.iter_mut().zip(v) {
                *slot = i32::from(s);
            }
            Conversion {
                written: v.len(),
                clipped: 0,
            }
        }
        Samples::Int32(v) => {
            dest[..v.len()].copy_from_slice(v);
            Conversion {
                written: v.len(),
                clipped: 0,
            }
        }
        Samples::Float32(v) => {
            let mut clipped = 0;
            for (slot, &s) in dest.iter_mut().zip(v) {
                let (value, was_clipped) = clip_f32(s);
                *slot = value;
                clipped += usize::from(was_clipped);
            }
            Conversion {
                written: v.len(),
                clipped,
            }
        }
    }
}

/// Saturate a float to the `i32` range, truncating toward zero inside it.
///
/// Returns the converted value and whether it was clipped. NaN has no
/// nearest bound and becomes 0, counted as clipped.
pub fn clip_f32(value: f32) -> (i32, bool) {
    if value.is_nan() {
        (0, true)
    } else if value < i32::MIN as f32 {
        (i32::MIN, true)
    } else if value >= i32::MAX as f32 {
        // i32::MAX is not representable as f32; the cast rounds up to 2^31.
        (i32::MAX, true)
    } else {
        (value as i32, false)
    }
}
