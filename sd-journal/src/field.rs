//! Well-known journal fields and field-name validation.
//!
//! Field names are 1 to 255 bytes of uppercase ASCII letters, digits and
//! underscores. Names starting with `_` are trusted fields, set only by the
//! journal daemon.

use crate::error::{JournalError, Result};
use std::fmt;

const MAX_FIELD_NAME_LEN: usize = 255;

/// How a field's value is meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// UTF-8 text.
    Text,
    /// Arbitrary bytes.
    Binary,
    /// A numeric user id written as text.
    Uid,
}

/// Returns true if `name` is a syntactically valid field name.
pub fn is_field_name_valid(name: &[u8]) -> bool {
    if name.is_empty() || name.len() > MAX_FIELD_NAME_LEN {
        return false;
    }

    name.iter()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || *b == b'_')
}

/// Validates a field name about to be read.
pub fn validate_field_name(name: &str) -> Result<()> {
    if is_field_name_valid(name.as_bytes()) {
        Ok(())
    } else {
        Err(JournalError::InvalidFieldName(name.to_owned()))
    }
}

/// A caller-supplied field name that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldName<'a>(&'a str);

impl<'a> FieldName<'a> {
    /// Any valid field name, trusted ones included. Used for reads.
    pub fn new(name: &'a str) -> Result<Self> {
        validate_field_name(name)?;
        Ok(Self(name))
    }

    /// A valid field name that callers may filter on: trusted names are
    /// rejected, use [`JournalField`] to filter on those.
    pub fn for_match(name: &'a str) -> Result<Self> {
        let name = Self::new(name)?;
        if name.is_trusted() {
            return Err(JournalError::InvalidFieldName(name.0.to_owned()));
        }
        Ok(name)
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }

    pub fn is_trusted(&self) -> bool {
        self.0.starts_with('_')
    }
}

impl fmt::Display for FieldName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

macro_rules! journal_fields {
    ($($(#[$meta:meta])* $variant:ident => $name:tt, $kind:ident;)*) => {
        /// Well-known journal fields.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum JournalField {
            $($(#[$meta])* $variant,)*
        }

        static BY_NAME: phf::Map<&'static str, JournalField> = phf::phf_map! {
            $($name => JournalField::$variant,)*
        };

        impl JournalField {
            /// Every well-known field, in declaration order.
            pub const ALL: &'static [JournalField] = &[$(JournalField::$variant,)*];

            /// The field name as stored in the journal.
            pub fn name(self) -> &'static str {
                match self {
                    $(JournalField::$variant => $name,)*
                }
            }

            pub fn kind(self) -> FieldKind {
                match self {
                    $(JournalField::$variant => FieldKind::$kind,)*
                }
            }
        }
    };
}

journal_fields! {
    /// Human-readable message text.
    Message => "MESSAGE", Text;
    /// 128-bit message identifier.
    MessageId => "MESSAGE_ID", Text;
    /// Syslog priority, 0 (emerg) to 7 (debug).
    Priority => "PRIORITY", Text;
    CodeFile => "CODE_FILE", Text;
    CodeLine => "CODE_LINE", Text;
    CodeFunc => "CODE_FUNC", Text;
    /// Low-level errno of the logged failure.
    Errno => "ERRNO", Text;
    InvocationId => "INVOCATION_ID", Text;
    UserInvocationId => "USER_INVOCATION_ID", Text;
    SyslogFacility => "SYSLOG_FACILITY", Text;
    SyslogIdentifier => "SYSLOG_IDENTIFIER", Text;
    SyslogPid => "SYSLOG_PID", Text;
    SyslogTimestamp => "SYSLOG_TIMESTAMP", Text;
    /// The original syslog line, possibly not valid UTF-8.
    SyslogRaw => "SYSLOG_RAW", Binary;
    Documentation => "DOCUMENTATION", Text;
    Tid => "TID", Text;
    Pid => "_PID", Text;
    Uid => "_UID", Text;
    Gid => "_GID", Text;
    Comm => "_COMM", Text;
    Exe => "_EXE", Text;
    Cmdline => "_CMDLINE", Text;
    CapEffective => "_CAP_EFFECTIVE", Text;
    AuditSession => "_AUDIT_SESSION", Text;
    AuditLoginUid => "_AUDIT_LOGINUID", Uid;
    SystemdCgroup => "_SYSTEMD_CGROUP", Text;
    SystemdSlice => "_SYSTEMD_SLICE", Text;
    SystemdUnit => "_SYSTEMD_UNIT", Text;
    SystemdUserUnit => "_SYSTEMD_USER_UNIT", Text;
    SystemdUserSlice => "_SYSTEMD_USER_SLICE", Text;
    SystemdSession => "_SYSTEMD_SESSION", Text;
    SystemdOwnerUid => "_SYSTEMD_OWNER_UID", Uid;
    SelinuxContext => "_SELINUX_CONTEXT", Text;
    /// Earliest trusted timestamp of the message, in microseconds.
    SourceRealtimeTimestamp => "_SOURCE_REALTIME_TIMESTAMP", Text;
    BootId => "_BOOT_ID", Text;
    MachineId => "_MACHINE_ID", Text;
    SystemdInvocationId => "_SYSTEMD_INVOCATION_ID", Text;
    Hostname => "_HOSTNAME", Text;
    /// How the entry reached the journal: `journal`, `syslog`, `kernel`, ...
    Transport => "_TRANSPORT", Text;
    StreamId => "_STREAM_ID", Text;
    LineBreak => "_LINE_BREAK", Text;
    Namespace => "_NAMESPACE", Text;
    KernelDevice => "_KERNEL_DEVICE", Text;
    KernelSubsystem => "_KERNEL_SUBSYSTEM", Text;
    UdevSysname => "_UDEV_SYSNAME", Text;
    UdevDevnode => "_UDEV_DEVNODE", Text;
    UdevDevlink => "_UDEV_DEVLINK", Text;
    CoredumpUnit => "COREDUMP_UNIT", Text;
    CoredumpUserUnit => "COREDUMP_USER_UNIT", Text;
    ObjectPid => "OBJECT_PID", Text;
    ObjectUid => "OBJECT_UID", Text;
    ObjectGid => "OBJECT_GID", Text;
    ObjectComm => "OBJECT_COMM", Text;
    ObjectExe => "OBJECT_EXE", Text;
    ObjectCmdline => "OBJECT_CMDLINE", Text;
    ObjectAuditSession => "OBJECT_AUDIT_SESSION", Text;
    ObjectAuditLoginUid => "OBJECT_AUDIT_LOGINUID", Text;
    ObjectSystemdCgroup => "OBJECT_SYSTEMD_CGROUP", Text;
    ObjectSystemdSession => "OBJECT_SYSTEMD_SESSION", Text;
    ObjectSystemdOwnerUid => "OBJECT_SYSTEMD_OWNER_UID", Text;
    ObjectSystemdUnit => "OBJECT_SYSTEMD_UNIT", Text;
    ObjectSystemdUserUnit => "OBJECT_SYSTEMD_USER_UNIT", Text;
}

impl JournalField {
    /// Looks up a well-known field by its journal name.
    pub fn lookup(name: &str) -> Option<Self> {
        BY_NAME.get(name).copied()
    }

    /// Trusted fields are added by the journal daemon, never by clients.
    pub fn is_trusted(self) -> bool {
        self.name().starts_with('_')
    }
}

impl fmt::Display for JournalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
