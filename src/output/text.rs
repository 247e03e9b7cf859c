//! Plain text listing of duplicate groups.
//!
//! Each group is a `Dup: (size)` header followed by its members, indented
//! two spaces, in the order they were found:
//!
//! ```text
//! Dup: (1.2 MiB)
//!   /photos/IMG_0001.jpg
//!   /backup/photos/IMG_0001.jpg
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::duplicates::DuplicateGroup;

/// Text output formatter.
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> TextOutput<'a> {
    /// Create a new text output formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write every group to `writer`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for group in self.groups {
            writeln!(writer, "Dup: ({})", ByteSize::b(group.size))?;
            for file in &group.files {
                writeln!(writer, "  {}", file.path().display())?;
            }
        }
        Ok(())
    }

    /// Render the listing as a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
