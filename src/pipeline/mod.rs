//! Pipeline stages for moving one image into the output directory.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ hash ──▶ sniff ──▶ relocate ──▶ tool
//! (exists?)  (image)    (md5)    (magic)   (rename)     (wpg -a)
//! ```
//!
//! 1. [`input`]    — the source must exist and be readable
//! 2. [`decode`]   — decode to a `DynamicImage`; runs in `spawn_blocking`
//! 3. [`hash`]     — MD5 over the decoded pixels
//! 4. [`sniff`]    — extension from the leading bytes, never the file name
//! 5. [`relocate`] — atomic rename under the collision policy
//! 6. [`tool`]     — optional `<tool> -a <destination>`

pub mod decode;
pub mod hash;
pub mod input;
pub mod relocate;
pub mod sniff;
pub mod tool;
