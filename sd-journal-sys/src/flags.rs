//! Open flag bits accepted by `sd_journal_open*`.

use std::ffi::c_int;

pub const SD_JOURNAL_LOCAL_ONLY: c_int = 1 << 0;
pub const SD_JOURNAL_RUNTIME_ONLY: c_int = 1 << 1;
pub const SD_JOURNAL_SYSTEM: c_int = 1 << 2;
pub const SD_JOURNAL_CURRENT_USER: c_int = 1 << 3;
pub const SD_JOURNAL_OS_ROOT: c_int = 1 << 4;
pub const SD_JOURNAL_ALL_NAMESPACES: c_int = 1 << 5;
pub const SD_JOURNAL_INCLUDE_DEFAULT_NAMESPACE: c_int = 1 << 6;

/// Flags accepted by `sd_journal_open` and `sd_journal_open_namespace`.
pub const SD_JOURNAL_OPEN_MASK: c_int = SD_JOURNAL_LOCAL_ONLY
    | SD_JOURNAL_RUNTIME_ONLY
    | SD_JOURNAL_SYSTEM
    | SD_JOURNAL_CURRENT_USER
    | SD_JOURNAL_ALL_NAMESPACES
    | SD_JOURNAL_INCLUDE_DEFAULT_NAMESPACE;

/// Flags accepted by `sd_journal_open_directory`.
pub const SD_JOURNAL_DIRECTORY_MASK: c_int =
    SD_JOURNAL_OS_ROOT | SD_JOURNAL_SYSTEM | SD_JOURNAL_CURRENT_USER;
