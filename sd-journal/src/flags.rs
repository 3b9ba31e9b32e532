use sd_journal_sys::flags::*;
use std::fmt;

bitflags::bitflags! {
    /// Flags for opening a journal.
    ///
    /// The bits are passed unchanged to the native open call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        /// Only files generated on the local machine.
        const LOCAL_ONLY = SD_JOURNAL_LOCAL_ONLY as u32;
        /// Only volatile journal files, excluding persistent ones.
        const RUNTIME_ONLY = SD_JOURNAL_RUNTIME_ONLY as u32;
        /// System services and the kernel.
        const SYSTEM = SD_JOURNAL_SYSTEM as u32;
        /// The current user.
        const CURRENT_USER = SD_JOURNAL_CURRENT_USER as u32;
        /// Treat the directory as the root of an OS tree.
        const OS_ROOT = SD_JOURNAL_OS_ROOT as u32;
        /// All namespaces.
        const ALL_NAMESPACES = SD_JOURNAL_ALL_NAMESPACES as u32;
        /// The default namespace in addition to the requested one.
        const INCLUDE_DEFAULT_NAMESPACE = SD_JOURNAL_INCLUDE_DEFAULT_NAMESPACE as u32;
    }
}

impl OpenFlags {
    /// Flags accepted when opening a directory.
    pub const DIRECTORY_OPEN: Self = Self::OS_ROOT
        .union(Self::SYSTEM)
        .union(Self::CURRENT_USER);

    pub(crate) fn raw(self) -> std::ffi::c_int {
        self.bits() as std::ffi::c_int
    }
}

/// Which open variant produced a journal handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Flags,
    Namespace,
    Files,
    Directory,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpenMode::Flags => "flags",
            OpenMode::Namespace => "namespace",
            OpenMode::Files => "files",
            OpenMode::Directory => "directory",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_match_the_native_values() {
        assert_eq!(OpenFlags::LOCAL_ONLY.bits(), 1);
        assert_eq!(OpenFlags::INCLUDE_DEFAULT_NAMESPACE.bits(), 1 << 6);
        assert_eq!(
            (OpenFlags::SYSTEM | OpenFlags::CURRENT_USER).raw(),
            SD_JOURNAL_SYSTEM | SD_JOURNAL_CURRENT_USER
        );
    }

    #[test]
    fn directory_open_accepts_three_flags() {
        assert!(OpenFlags::DIRECTORY_OPEN.contains(OpenFlags::OS_ROOT));
        assert!(!OpenFlags::DIRECTORY_OPEN.contains(OpenFlags::RUNTIME_ONLY));
        assert_eq!(OpenFlags::DIRECTORY_OPEN.bits().count_ones(), 3);
    }
}
