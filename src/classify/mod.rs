//! Content-based classification of merge candidates.
//!
//! Whether a file is eligible for architecture merging is decided from its
//! first bytes, never from its path or extension. Build trees routinely
//! contain extensionless executables and `.a` files that are actually text
//! (linker scripts), so the sniff is the only reliable signal.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Magic numbers accepted as mergeable binary images, in on-disk byte order.
///
/// Fat headers are big-endian on disk; thin Mach-O headers appear in either
/// byte order depending on the architecture that produced them.
const MACHO_MAGICS: &[[u8; 4]] = &[
    [0xca, 0xfe, 0xba, 0xbe], // FAT_MAGIC
    [0xbe, 0xba, 0xfe, 0xca], // FAT_CIGAM
    [0xfe, 0xed, 0xfa, 0xce], // MH_MAGIC
    [0xce, 0xfa, 0xed, 0xfe], // MH_CIGAM
    [0xfe, 0xed, 0xfa, 0xcf], // MH_MAGIC_64
    [0xcf, 0xfa, 0xed, 0xfe], // MH_CIGAM_64
];

/// ar(5) global header, as found at the start of static library archives.
const AR_MAGIC: &[u8; 8] = b"!<arch>\n";

/// Decides whether a file is a binary image the merge tool can combine.
///
/// Implementations must be pure content checks with no side effects so they
/// can be substituted in tests without touching the traversal.
pub trait ArtifactDetector {
    fn is_artifact(&self, path: &Path) -> bool;
}

impl<D: ArtifactDetector + ?Sized> ArtifactDetector for &D {
    fn is_artifact(&self, path: &Path) -> bool {
        (**self).is_artifact(path)
    }
}

/// Production detector: sniffs Mach-O and static-library magic numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MachODetector;

impl ArtifactDetector for MachODetector {
    fn is_artifact(&self, path: &Path) -> bool {
        is_macho_image(path)
    }
}

/// Check whether a file starts with a Mach-O magic (thin or fat, either byte
/// order) or the ar archive header.
///
/// Unreadable, empty, and too-short files are reported as plain; they fall
/// through to the copy path where any real I/O problem surfaces.
pub fn is_macho_image(path: &Path) -> bool {
    is_macho_image_impl(path).unwrap_or(false)
}

fn is_macho_image_impl(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 8];
    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    if filled == header.len() && &header == AR_MAGIC {
        return Ok(true);
    }
    if filled >= 4 {
        return Ok(MACHO_MAGICS.iter().any(|magic| magic[..] == header[..4]));
    }
    Ok(false)
}
