//! `NativeOps` backed by the system's `libsystemd`.
//!
//! The library is resolved with `dlopen` the first time [`LibSystemd::get`]
//! is called. The symbol table is process-wide, initialized once and never
//! unloaded.

use crate::NativeOps;
use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::ptr::{self, NonNull};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

type SdJournal = c_void;

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("cannot load libsystemd: {0}")]
    Library(String),

    #[error("libsystemd does not export {symbol}: {reason}")]
    Symbol { symbol: String, reason: String },
}

const LIBRARY_NAMES: &[&CStr] = &[c"libsystemd.so.0", c"libsystemd.so"];

static SYMBOLS: OnceLock<Result<Symbols, LoadError>> = OnceLock::new();

macro_rules! symbols {
    ($($field:ident = $symbol:literal: fn($($arg:ty),*) -> $ret:ty;)*) => {
        struct Symbols {
            $($field: unsafe extern "C" fn($($arg),*) -> $ret,)*
        }

        impl Symbols {
            /// # Safety
            ///
            /// `lib` must be a live handle returned by `dlopen` for libsystemd.
            unsafe fn resolve(lib: *mut c_void) -> Result<Self, LoadError> {
                Ok(Self {
                    $($field: {
                        let sym = unsafe { lookup(lib, $symbol)? };
                        // SAFETY: the exported symbol has the C signature declared here.
                        unsafe {
                            std::mem::transmute::<*mut c_void, unsafe extern "C" fn($($arg),*) -> $ret>(sym)
                        }
                    },)*
                })
            }
        }
    };
}

symbols! {
    open = c"sd_journal_open": fn(*mut *mut SdJournal, c_int) -> c_int;
    open_namespace = c"sd_journal_open_namespace": fn(*mut *mut SdJournal, *const c_char, c_int) -> c_int;
    open_files = c"sd_journal_open_files": fn(*mut *mut SdJournal, *const *const c_char, c_int) -> c_int;
    open_directory = c"sd_journal_open_directory": fn(*mut *mut SdJournal, *const c_char, c_int) -> c_int;
    close = c"sd_journal_close": fn(*mut SdJournal) -> ();
    next = c"sd_journal_next": fn(*mut SdJournal) -> c_int;
    previous = c"sd_journal_previous": fn(*mut SdJournal) -> c_int;
    next_skip = c"sd_journal_next_skip": fn(*mut SdJournal, u64) -> c_int;
    previous_skip = c"sd_journal_previous_skip": fn(*mut SdJournal, u64) -> c_int;
    seek_head = c"sd_journal_seek_head": fn(*mut SdJournal) -> c_int;
    seek_tail = c"sd_journal_seek_tail": fn(*mut SdJournal) -> c_int;
    seek_cursor = c"sd_journal_seek_cursor": fn(*mut SdJournal, *const c_char) -> c_int;
    get_cursor = c"sd_journal_get_cursor": fn(*mut SdJournal, *mut *mut c_char) -> c_int;
    test_cursor = c"sd_journal_test_cursor": fn(*mut SdJournal, *const c_char) -> c_int;
    restart_fields = c"sd_journal_restart_fields": fn(*mut SdJournal) -> ();
    enumerate_fields = c"sd_journal_enumerate_fields": fn(*mut SdJournal, *mut *const c_char) -> c_int;
    get_data = c"sd_journal_get_data": fn(*mut SdJournal, *const c_char, *mut *const c_void, *mut usize) -> c_int;
    add_match = c"sd_journal_add_match": fn(*mut SdJournal, *const c_void, usize) -> c_int;
    add_disjunction = c"sd_journal_add_disjunction": fn(*mut SdJournal) -> c_int;
    add_conjunction = c"sd_journal_add_conjunction": fn(*mut SdJournal) -> c_int;
    flush_matches = c"sd_journal_flush_matches": fn(*mut SdJournal) -> ();
    get_cutoff_realtime_usec = c"sd_journal_get_cutoff_realtime_usec": fn(*mut SdJournal, *mut u64, *mut u64) -> c_int;
    get_realtime_usec = c"sd_journal_get_realtime_usec": fn(*mut SdJournal, *mut u64) -> c_int;
    get_usage = c"sd_journal_get_usage": fn(*mut SdJournal, *mut u64) -> c_int;
    has_runtime_files = c"sd_journal_has_runtime_files": fn(*mut SdJournal) -> c_int;
    has_persistent_files = c"sd_journal_has_persistent_files": fn(*mut SdJournal) -> c_int;
}

/// # Safety
///
/// `lib` must be a live `dlopen` handle.
unsafe fn lookup(lib: *mut c_void, symbol: &CStr) -> Result<*mut c_void, LoadError> {
    let sym = unsafe { libc::dlsym(lib, symbol.as_ptr()) };
    if sym.is_null() {
        return Err(LoadError::Symbol {
            symbol: symbol.to_string_lossy().into_owned(),
            reason: last_dl_error(),
        });
    }
    Ok(sym)
}

fn last_dl_error() -> String {
    // SAFETY: dlerror returns NULL or a NUL-terminated, thread-local message.
    let msg = unsafe { libc::dlerror() };
    if msg.is_null() {
        return String::from("unknown dynamic linker error");
    }
    unsafe { CStr::from_ptr(msg) }
        .to_string_lossy()
        .into_owned()
}

fn load() -> Result<Symbols, LoadError> {
    let mut reason = String::new();

    for name in LIBRARY_NAMES {
        // SAFETY: `name` is NUL-terminated. The handle is never closed, the
        // resolved symbols stay in use until the process exits.
        let lib = unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if lib.is_null() {
            reason = last_dl_error();
            continue;
        }

        debug!(library = %name.to_string_lossy(), "loaded libsystemd");
        // SAFETY: `lib` was just returned by dlopen.
        return unsafe { Symbols::resolve(lib) };
    }

    warn!(%reason, "libsystemd is not available");
    Err(LoadError::Library(reason))
}

/// An open `sd_journal *`.
#[derive(Debug)]
pub struct RawJournal(NonNull<SdJournal>);

// SAFETY: sd_journal sessions may move between threads; `NativeOps` takes
// them by `&mut`, so they are never used from two threads at once.
unsafe impl Send for RawJournal {}

impl RawJournal {
    fn as_ptr(&self) -> *mut SdJournal {
        self.0.as_ptr()
    }
}

/// The `libsystemd` symbol table.
#[derive(Clone, Copy)]
pub struct LibSystemd {
    symbols: &'static Symbols,
}

impl std::fmt::Debug for LibSystemd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibSystemd").finish_non_exhaustive()
    }
}

impl LibSystemd {
    /// Returns the process-wide symbol table, loading the library on first use.
    pub fn get() -> Result<Self, LoadError> {
        match SYMBOLS.get_or_init(load) {
            Ok(symbols) => Ok(Self { symbols }),
            Err(e) => Err(e.clone()),
        }
    }
}

fn opened(r: c_int, j: *mut SdJournal, ret: &mut Option<RawJournal>) -> c_int {
    if r >= 0 {
        *ret = NonNull::new(j).map(RawJournal);
    }
    r
}

impl NativeOps for LibSystemd {
    type Journal = RawJournal;

    fn open(&self, ret: &mut Option<RawJournal>, flags: c_int) -> c_int {
        let mut j: *mut SdJournal = ptr::null_mut();
        // SAFETY: `j` is a valid out-pointer.
        let r = unsafe { (self.symbols.open)(&mut j, flags) };
        opened(r, j, ret)
    }

    fn open_namespace(
        &self,
        ret: &mut Option<RawJournal>,
        namespace: Option<&CStr>,
        flags: c_int,
    ) -> c_int {
        let mut j: *mut SdJournal = ptr::null_mut();
        let namespace = namespace.map_or(ptr::null(), CStr::as_ptr);
        // SAFETY: `namespace` is NULL or NUL-terminated.
        let r = unsafe { (self.symbols.open_namespace)(&mut j, namespace, flags) };
        opened(r, j, ret)
    }

    fn open_files(&self, ret: &mut Option<RawJournal>, paths: &[&CStr], flags: c_int) -> c_int {
        let mut argv: Vec<*const c_char> = paths.iter().map(|p| p.as_ptr()).collect();
        argv.push(ptr::null());

        let mut j: *mut SdJournal = ptr::null_mut();
        // SAFETY: `argv` is a NULL-terminated array of C strings that outlive the call.
        let r = unsafe { (self.symbols.open_files)(&mut j, argv.as_ptr(), flags) };
        opened(r, j, ret)
    }

    fn open_directory(&self, ret: &mut Option<RawJournal>, path: &CStr, flags: c_int) -> c_int {
        let mut j: *mut SdJournal = ptr::null_mut();
        // SAFETY: `path` is NUL-terminated.
        let r = unsafe { (self.symbols.open_directory)(&mut j, path.as_ptr(), flags) };
        opened(r, j, ret)
    }

    fn close(&self, j: RawJournal) {
        // SAFETY: the session is consumed, so this is its only close.
        unsafe { (self.symbols.close)(j.as_ptr()) }
    }

    fn next(&self, j: &mut RawJournal) -> c_int {
        unsafe { (self.symbols.next)(j.as_ptr()) }
    }

    fn previous(&self, j: &mut RawJournal) -> c_int {
        unsafe { (self.symbols.previous)(j.as_ptr()) }
    }

    fn next_skip(&self, j: &mut RawJournal, skip: u64) -> c_int {
        unsafe { (self.symbols.next_skip)(j.as_ptr(), skip) }
    }

    fn previous_skip(&self, j: &mut RawJournal, skip: u64) -> c_int {
        unsafe { (self.symbols.previous_skip)(j.as_ptr(), skip) }
    }

    fn seek_head(&self, j: &mut RawJournal) -> c_int {
        unsafe { (self.symbols.seek_head)(j.as_ptr()) }
    }

    fn seek_tail(&self, j: &mut RawJournal) -> c_int {
        unsafe { (self.symbols.seek_tail)(j.as_ptr()) }
    }

    fn seek_cursor(&self, j: &mut RawJournal, cursor: &CStr) -> c_int {
        unsafe { (self.symbols.seek_cursor)(j.as_ptr(), cursor.as_ptr()) }
    }

    fn get_cursor(&self, j: &mut RawJournal, ret: &mut Option<CString>) -> c_int {
        let mut cursor: *mut c_char = ptr::null_mut();
        let r = unsafe { (self.symbols.get_cursor)(j.as_ptr(), &mut cursor) };
        if r >= 0 && !cursor.is_null() {
            // SAFETY: on success the library returns a malloc'ed C string
            // that the caller must free.
            unsafe {
                *ret = Some(CStr::from_ptr(cursor).to_owned());
                libc::free(cursor.cast());
            }
        }
        r
    }

    fn test_cursor(&self, j: &mut RawJournal, cursor: &CStr) -> c_int {
        unsafe { (self.symbols.test_cursor)(j.as_ptr(), cursor.as_ptr()) }
    }

    fn restart_fields(&self, j: &mut RawJournal) {
        unsafe { (self.symbols.restart_fields)(j.as_ptr()) }
    }

    fn enumerate_fields<'j>(
        &self,
        j: &'j mut RawJournal,
        field: &mut Option<&'j CStr>,
    ) -> c_int {
        let mut name: *const c_char = ptr::null();
        let r = unsafe { (self.symbols.enumerate_fields)(j.as_ptr(), &mut name) };
        if r > 0 && !name.is_null() {
            // SAFETY: the name stays valid until the next call on `j`, which
            // the `'j` borrow rules out.
            *field = Some(unsafe { CStr::from_ptr(name) });
        }
        r
    }

    fn get_data<'j>(
        &self,
        j: &'j mut RawJournal,
        field: &CStr,
        data: &mut Option<&'j [u8]>,
    ) -> c_int {
        let mut payload: *const c_void = ptr::null();
        let mut len: usize = 0;
        let r =
            unsafe { (self.symbols.get_data)(j.as_ptr(), field.as_ptr(), &mut payload, &mut len) };
        if r >= 0 && !payload.is_null() {
            // SAFETY: the payload stays mapped until the next call on `j`,
            // which the `'j` borrow rules out.
            *data = Some(unsafe { std::slice::from_raw_parts(payload.cast::<u8>(), len) });
        }
        r
    }

    fn add_match(&self, j: &mut RawJournal, data: &[u8]) -> c_int {
        unsafe { (self.symbols.add_match)(j.as_ptr(), data.as_ptr().cast(), data.len()) }
    }

    fn add_disjunction(&self, j: &mut RawJournal) -> c_int {
        unsafe { (self.symbols.add_disjunction)(j.as_ptr()) }
    }

    fn add_conjunction(&self, j: &mut RawJournal) -> c_int {
        unsafe { (self.symbols.add_conjunction)(j.as_ptr()) }
    }

    fn flush_matches(&self, j: &mut RawJournal) {
        unsafe { (self.symbols.flush_matches)(j.as_ptr()) }
    }

    fn get_cutoff_realtime_usec(&self, j: &mut RawJournal, from: &mut u64, to: &mut u64) -> c_int {
        unsafe { (self.symbols.get_cutoff_realtime_usec)(j.as_ptr(), from, to) }
    }

    fn get_realtime_usec(&self, j: &mut RawJournal, ret: &mut u64) -> c_int {
        unsafe { (self.symbols.get_realtime_usec)(j.as_ptr(), ret) }
    }

    fn get_usage(&self, j: &mut RawJournal, bytes: &mut u64) -> c_int {
        unsafe { (self.symbols.get_usage)(j.as_ptr(), bytes) }
    }

    fn has_runtime_files(&self, j: &mut RawJournal) -> c_int {
        unsafe { (self.symbols.has_runtime_files)(j.as_ptr()) }
    }

    fn has_persistent_files(&self, j: &mut RawJournal) -> c_int {
        unsafe { (self.symbols.has_persistent_files)(j.as_ptr()) }
    }
}
