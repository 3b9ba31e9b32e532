//! Smoke tests against the host journal. They need `libsystemd` and read
//! access to journal files, so they only run on request:
//!
//! ```sh
//! cargo test -p sd-journal --test libsystemd -- --ignored
//! ```

use sd_journal::{Journal, JournalError, OpenFlags};

#[test]
#[ignore = "needs libsystemd and a readable journal"]
fn reads_the_latest_entries() {
    let mut journal = Journal::open(OpenFlags::LOCAL_ONLY).unwrap();
    journal.move_to_latest().unwrap();

    let mut seen = 0;
    while seen < 10 && journal.move_to_previous().unwrap() {
        journal.timestamp_usec().unwrap();
        journal.cursor().unwrap();
        match journal.read_message() {
            Ok(_) | Err(JournalError::FieldEmpty(_)) | Err(JournalError::NoSuchField(_)) => {}
            Err(e) => panic!("reading MESSAGE failed: {e}"),
        }
        seen += 1;
    }

    journal.close();
    assert!(matches!(journal.move_to_next(), Err(JournalError::Closed)));
}

#[test]
#[ignore = "needs libsystemd and a readable journal"]
fn cursor_round_trip() {
    let mut journal = Journal::open_default().unwrap();
    journal.move_to_earliest().unwrap();
    if !journal.move_to_next().unwrap() {
        return;
    }
    let cursor = journal.cursor().unwrap();
    journal.skip(5).unwrap();
    assert!(journal.seek_cursor(&cursor).unwrap());
}
