//! Pipeline stages for image-to-PDF conversion.
//!
//! Each submodule implements exactly one step and is tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ order ──▶ assemble (──▶ encode, per page)
//! (paths)   (sort)    (lopdf)
//! ```
//!
//! 1. [`input`]    — split the comma-separated input, walk directories,
//!    filter by extension and stat every candidate
//! 2. [`order`]    — apply the selected [`crate::SortOrder`] with a stable sort
//! 3. [`assemble`] — the [`assemble::Assembler`] seam and the default
//!    `lopdf`-backed implementation
//! 4. [`encode`]   — decoded image → compressed XObject samples

pub mod assemble;
pub mod encode;
pub mod input;
pub mod order;
