//! C ABI wrapper for the fdnverb reverb.
//!
//! Exposes functions to create/destroy a reverb, process audio in three
//! buffer shapes, set and read the five controls and load factory presets.
//! `include/fdnverb.h` mirrors this file.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle type: `FdnverbReverb` (heap-allocated; you own/delete it).
//! - A NULL handle or buffer makes every call a no-op returning 0.
//!
//! Threading
//! - The object is NOT thread-safe; call all functions from the same audio thread.

use std::ffi::{c_char, CStr};

use fdnverb_engine::{presets, Frame, Reverb, FACTORY_PRESETS, TAIL_SECONDS};

/// Opaque reverb handle handed to C.
pub struct FdnverbReverb {
    inner: Box<Reverb>,
}

/// NUL-terminated copies of the factory preset names, same order.
const PRESET_NAMES: [&CStr; FACTORY_PRESETS.len()] = [
    c"Default",
    c"Small Room",
    c"Large Hall",
    c"Cathedral",
    c"Ambient Pad",
    c"Shimmer",
    c"Vintage Plate",
    c"Tight Ambience",
    c"Dark Space",
    c"Infinite",
];

#[inline]
fn handle<'a>(reverb: *mut FdnverbReverb) -> Option<&'a mut Reverb> {
    // SAFETY: non-null handles come from `fdnverb_create` and are not aliased
    // across threads by contract.
    unsafe { reverb.as_mut() }.map(|r| &mut *r.inner)
}

#[inline]
fn handle_ref<'a>(reverb: *const FdnverbReverb) -> Option<&'a Reverb> {
    // SAFETY: see `handle`.
    unsafe { reverb.as_ref() }.map(|r| &*r.inner)
}

// --- Creation / destruction -------------------------------------------------------

/// Create a reverb initialized at `sample_rate` with default controls.
///
/// The delay memory is built on the heap, so this is safe to call from
/// threads with a small stack.
#[no_mangle]
pub extern "C" fn fdnverb_create(sample_rate: f32) -> *mut FdnverbReverb {
    let reverb = Box::new(FdnverbReverb { inner: Reverb::new_boxed(sample_rate) });
    log::debug!("fdnverb_create: sr={}", reverb.inner.sample_rate());
    Box::into_raw(reverb)
}

/// Destroy a reverb previously returned by `fdnverb_create`.
#[no_mangle]
pub extern "C" fn fdnverb_destroy(reverb: *mut FdnverbReverb) {
    if !reverb.is_null() {
        log::debug!("fdnverb_destroy");
        // SAFETY: the pointer came from `Box::into_raw` in `fdnverb_create`.
        unsafe { drop(Box::from_raw(reverb)) };
    }
}

/// Clear memory, rescale LFOs for `sample_rate` and restore default controls.
#[no_mangle]
pub extern "C" fn fdnverb_init(reverb: *mut FdnverbReverb, sample_rate: f32) {
    if let Some(r) = handle(reverb) {
        r.init(sample_rate);
    }
}

/// Silence the tail, keeping controls.
#[no_mangle]
pub extern "C" fn fdnverb_clear(reverb: *mut FdnverbReverb) {
    if let Some(r) = handle(reverb) {
        r.clear();
    }
}

// --- Processing ------------------------------------------------------------------

/// Process `frames` interleaved L/R pairs in place. Returns frames processed.
#[no_mangle]
pub extern "C" fn fdnverb_process_interleaved(reverb: *mut FdnverbReverb, interleaved: *mut f32, frames: u32) -> u32 {
    let Some(r) = handle(reverb) else { return 0 };
    if interleaved.is_null() || frames == 0 {
        return 0;
    }
    // SAFETY: `Frame` is `repr(C)` with two f32 fields, so `frames` frames span
    // exactly the `2 * frames` floats the caller provides.
    let buf = unsafe { std::slice::from_raw_parts_mut(interleaved.cast::<Frame>(), frames as usize) };
    r.process(buf);
    frames
}

/// Process separate channel buffers in place.
#[no_mangle]
pub extern "C" fn fdnverb_process_split(reverb: *mut FdnverbReverb, left: *mut f32, right: *mut f32, frames: u32) -> u32 {
    let Some(r) = handle(reverb) else { return 0 };
    if left.is_null() || right.is_null() || frames == 0 {
        return 0;
    }
    let n = frames as usize;
    // SAFETY: caller provides two distinct buffers of `frames` floats.
    let (l, rr) = unsafe { (std::slice::from_raw_parts_mut(left, n), std::slice::from_raw_parts_mut(right, n)) };
    r.process_split(l, rr);
    frames
}

/// Mono in, stereo out. `input` may not alias the outputs.
#[no_mangle]
pub extern "C" fn fdnverb_process_mono(
    reverb: *mut FdnverbReverb,
    input: *const f32,
    left: *mut f32,
    right: *mut f32,
    frames: u32,
) -> u32 {
    let Some(r) = handle(reverb) else { return 0 };
    if input.is_null() || left.is_null() || right.is_null() || frames == 0 {
        return 0;
    }
    let n = frames as usize;
    // SAFETY: caller provides three non-overlapping buffers of `frames` floats.
    let (x, l, rr) = unsafe {
        (
            std::slice::from_raw_parts(input, n),
            std::slice::from_raw_parts_mut(left, n),
            std::slice::from_raw_parts_mut(right, n),
        )
    };
    r.process_mono(x, l, rr);
    frames
}

// --- Controls --------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn fdnverb_set_amount(reverb: *mut FdnverbReverb, value: f32) {
    if let Some(r) = handle(reverb) { r.set_amount(value); }
}

#[no_mangle]
pub extern "C" fn fdnverb_set_input_gain(reverb: *mut FdnverbReverb, value: f32) {
    if let Some(r) = handle(reverb) { r.set_input_gain(value); }
}

#[no_mangle]
pub extern "C" fn fdnverb_set_time(reverb: *mut FdnverbReverb, value: f32) {
    if let Some(r) = handle(reverb) { r.set_time(value); }
}

#[no_mangle]
pub extern "C" fn fdnverb_set_diffusion(reverb: *mut FdnverbReverb, value: f32) {
    if let Some(r) = handle(reverb) { r.set_diffusion(value); }
}

#[no_mangle]
pub extern "C" fn fdnverb_set_lp(reverb: *mut FdnverbReverb, value: f32) {
    if let Some(r) = handle(reverb) { r.set_lp(value); }
}

#[no_mangle]
pub extern "C" fn fdnverb_set_parameters(
    reverb: *mut FdnverbReverb,
    amount: f32,
    input_gain: f32,
    time: f32,
    diffusion: f32,
    lp: f32,
) {
    if let Some(r) = handle(reverb) {
        r.set_parameters(amount, input_gain, time, diffusion, lp);
    }
}

/// Non-zero enables the output soft clipper.
#[no_mangle]
pub extern "C" fn fdnverb_set_output_limiter(reverb: *mut FdnverbReverb, enabled: i32) {
    if let Some(r) = handle(reverb) { r.set_output_limiter(enabled != 0); }
}

#[no_mangle]
pub extern "C" fn fdnverb_get_amount(reverb: *const FdnverbReverb) -> f32 {
    handle_ref(reverb).map_or(0.0, Reverb::amount)
}

#[no_mangle]
pub extern "C" fn fdnverb_get_input_gain(reverb: *const FdnverbReverb) -> f32 {
    handle_ref(reverb).map_or(0.0, Reverb::input_gain)
}

#[no_mangle]
pub extern "C" fn fdnverb_get_time(reverb: *const FdnverbReverb) -> f32 {
    handle_ref(reverb).map_or(0.0, Reverb::time)
}

#[no_mangle]
pub extern "C" fn fdnverb_get_diffusion(reverb: *const FdnverbReverb) -> f32 {
    handle_ref(reverb).map_or(0.0, Reverb::diffusion)
}

#[no_mangle]
pub extern "C" fn fdnverb_get_lp(reverb: *const FdnverbReverb) -> f32 {
    handle_ref(reverb).map_or(0.0, Reverb::lp)
}

#[no_mangle]
pub extern "C" fn fdnverb_get_sample_rate(reverb: *const FdnverbReverb) -> f32 {
    handle_ref(reverb).map_or(0.0, Reverb::sample_rate)
}

// --- Presets ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn fdnverb_preset_count() -> u32 {
    FACTORY_PRESETS.len() as u32
}

/// Static NUL-terminated name, or NULL when `index` is out of range.
#[no_mangle]
pub extern "C" fn fdnverb_preset_name(index: u32) -> *const c_char {
    PRESET_NAMES.get(index as usize).map_or(std::ptr::null(), |name| name.as_ptr())
}

/// Returns 1 on success, 0 for a bad index or NULL handle.
#[no_mangle]
pub extern "C" fn fdnverb_load_preset(reverb: *mut FdnverbReverb, index: u32) -> i32 {
    match (handle(reverb), presets::by_index(index as usize)) {
        (Some(r), Some(p)) => {
            r.apply(&p.params);
            1
        }
        _ => 0,
    }
}

#[no_mangle]
pub extern "C" fn fdnverb_tail_seconds() -> f32 {
    TAIL_SECONDS
}
