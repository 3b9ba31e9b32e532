//! Reader behaviour against the in-memory backend.

use sd_journal::{
    Cursor, Journal, JournalError, JournalField, JournalHandle, MemoryBackend, MemoryEntry,
    MemorySource, Microseconds, OpenFlags, OpenMode, Origin,
};
use std::collections::{BTreeMap, HashMap};

/// System journal with `n` entries one second apart, alternating between
/// two units and priorities.
fn system(n: u64) -> MemorySource {
    MemorySource::new(Origin::System).entries((0..n).map(|i| {
        MemoryEntry::new(1_000_000 * (i + 1))
            .field("MESSAGE", format!("message {i}"))
            .field("PRIORITY", if i % 3 == 0 { "3" } else { "6" })
            .field("_SYSTEMD_UNIT", if i % 2 == 0 { "a.service" } else { "b.service" })
    }))
}

fn open(backend: MemoryBackend) -> Journal<MemoryBackend> {
    Journal::new(JournalHandle::open(backend, OpenFlags::empty()).unwrap())
}

fn count_forward(j: &mut Journal<MemoryBackend>) -> usize {
    j.move_to_earliest().unwrap();
    let mut n = 0;
    while j.move_to_next().unwrap() {
        n += 1;
    }
    n
}

#[test]
fn open_and_close_for_every_flag_combination() {
    let backend = MemoryBackend::new()
        .with_source(system(3))
        .with_source(MemorySource::new(Origin::User).runtime().entry(MemoryEntry::new(5)))
        .with_source(
            MemorySource::new(Origin::Namespace("audit".into())).entry(MemoryEntry::new(7)),
        );

    let combos = [
        OpenFlags::empty(),
        OpenFlags::LOCAL_ONLY,
        OpenFlags::RUNTIME_ONLY,
        OpenFlags::SYSTEM,
        OpenFlags::CURRENT_USER,
        OpenFlags::SYSTEM | OpenFlags::CURRENT_USER,
        OpenFlags::ALL_NAMESPACES,
        OpenFlags::LOCAL_ONLY | OpenFlags::RUNTIME_ONLY | OpenFlags::ALL_NAMESPACES,
    ];
    for flags in combos {
        let mut j = Journal::new(JournalHandle::open(backend.clone(), flags).unwrap());
        assert!(!j.is_closed(), "{flags:?}");
        assert_eq!(j.handle().mode(), OpenMode::Flags);
        j.close();
        j.close();
        assert!(j.is_closed(), "{flags:?}");
    }
}

#[test]
fn open_flags_select_sources() {
    let backend = MemoryBackend::new()
        .with_source(system(3))
        .with_source(MemorySource::new(Origin::User).runtime().entry(MemoryEntry::new(5)))
        .with_source(
            MemorySource::new(Origin::Namespace("audit".into())).entry(MemoryEntry::new(7)),
        );

    let count = |flags| {
        let mut j = Journal::new(JournalHandle::open(backend.clone(), flags).unwrap());
        count_forward(&mut j)
    };
    assert_eq!(count(OpenFlags::empty()), 4);
    assert_eq!(count(OpenFlags::SYSTEM), 3);
    assert_eq!(count(OpenFlags::CURRENT_USER), 1);
    assert_eq!(count(OpenFlags::RUNTIME_ONLY), 1);
    assert_eq!(count(OpenFlags::ALL_NAMESPACES), 5);

    let mut j = Journal::new(
        JournalHandle::open_namespace(backend.clone(), "audit", OpenFlags::empty()).unwrap(),
    );
    assert_eq!(count_forward(&mut j), 1);
    let mut j = Journal::new(
        JournalHandle::open_namespace(backend, "audit", OpenFlags::INCLUDE_DEFAULT_NAMESPACE)
            .unwrap(),
    );
    assert_eq!(count_forward(&mut j), 5);
}

#[test]
fn directory_and_file_opens() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("system.journal");

    let backend = MemoryBackend::new()
        .with_source(system(2))
        .with_source(
            MemorySource::new(Origin::Directory(dir.path().to_path_buf()))
                .entries([MemoryEntry::new(1), MemoryEntry::new(2), MemoryEntry::new(3)]),
        )
        .with_source(MemorySource::new(Origin::File(file.clone())).entry(MemoryEntry::new(4)));

    let mut j = Journal::new(
        JournalHandle::open_directory(backend.clone(), dir.path(), OpenFlags::empty()).unwrap(),
    );
    assert_eq!(j.handle().mode(), OpenMode::Directory);
    assert_eq!(count_forward(&mut j), 3);

    let files = JournalHandle::open_files(backend.clone(), &[&file], OpenFlags::empty());
    let mut j = Journal::new(files.unwrap());
    assert_eq!(count_forward(&mut j), 1);

    let missing = dir.path().join("missing");
    let err = JournalHandle::open_directory(backend, &missing, OpenFlags::empty()).unwrap_err();
    assert!(matches!(err, JournalError::FailedToOpen { mode: OpenMode::Directory, .. }));
}

#[test]
fn every_open_variant_closes_idempotently() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("user.journal");
    let backend = MemoryBackend::new()
        .with_source(system(2))
        .with_source(
            MemorySource::new(Origin::Directory(dir.path().to_path_buf()))
                .entries([MemoryEntry::new(1), MemoryEntry::new(2)]),
        )
        .with_source(MemorySource::new(Origin::File(file.clone())).entry(MemoryEntry::new(3)))
        .with_source(
            MemorySource::new(Origin::Namespace("audit".into())).entry(MemoryEntry::new(4)),
        );

    let close_twice = |handle: JournalHandle<MemoryBackend>, mode| {
        let mut j = Journal::new(handle);
        assert_eq!(j.handle().mode(), mode);
        assert!(!j.is_closed());
        j.close();
        j.close();
        assert!(j.is_closed());
        assert!(matches!(j.move_to_next(), Err(JournalError::Closed)));
    };

    let directory_combos = [
        OpenFlags::empty(),
        OpenFlags::OS_ROOT,
        OpenFlags::SYSTEM,
        OpenFlags::CURRENT_USER,
        OpenFlags::OS_ROOT | OpenFlags::SYSTEM,
        OpenFlags::OS_ROOT | OpenFlags::CURRENT_USER,
        OpenFlags::SYSTEM | OpenFlags::CURRENT_USER,
        OpenFlags::DIRECTORY_OPEN,
    ];
    for flags in directory_combos {
        let handle = JournalHandle::open_directory(backend.clone(), dir.path(), flags);
        close_twice(handle.unwrap(), OpenMode::Directory);
    }

    let namespace_combos = [
        OpenFlags::empty(),
        OpenFlags::LOCAL_ONLY,
        OpenFlags::RUNTIME_ONLY,
        OpenFlags::INCLUDE_DEFAULT_NAMESPACE,
        OpenFlags::ALL_NAMESPACES,
        OpenFlags::SYSTEM | OpenFlags::CURRENT_USER | OpenFlags::INCLUDE_DEFAULT_NAMESPACE,
    ];
    for flags in namespace_combos {
        let handle = JournalHandle::open_namespace(backend.clone(), "audit", flags);
        close_twice(handle.unwrap(), OpenMode::Namespace);
    }

    let handle = JournalHandle::open_files(backend.clone(), &[&file], OpenFlags::empty());
    close_twice(handle.unwrap(), OpenMode::Files);
    let handle = JournalHandle::open_default(backend);
    close_twice(handle.unwrap(), OpenMode::Flags);
}

#[test]
fn next_and_skip_agree_on_the_entry_count() {
    let mut j = open(MemoryBackend::new().with_source(system(17)));
    let stepped = count_forward(&mut j);

    j.move_to_earliest().unwrap();
    let shortfall = j.skip(1000).unwrap();
    assert_eq!(1000 - shortfall, stepped as u64);
    assert_eq!(stepped, 17);
}

#[test]
fn skip_there_and_back_returns_to_the_same_entry() {
    let mut j = open(MemoryBackend::new().with_source(system(10)));
    j.move_to_earliest().unwrap();
    j.skip(3).unwrap();
    let cursor = j.cursor().unwrap();

    assert_eq!(j.skip(4).unwrap(), 0);
    assert_eq!(j.skip(-4).unwrap(), 0);
    assert!(j.test_cursor(&cursor).unwrap());

    j.move_to_next().unwrap();
    assert!(!j.test_cursor(&cursor).unwrap());
}

#[test]
fn edited_cursors_are_rejected() {
    let mut j = open(MemoryBackend::new().with_source(system(5)));
    j.move_to_earliest().unwrap();
    j.skip(2).unwrap();
    let cursor = j.cursor().unwrap();

    let mut text = cursor.to_string().into_bytes();
    text[2] = if text[2] == b'0' { b'1' } else { b'0' };
    let edited = Cursor::try_from(text).unwrap();

    assert!(matches!(j.test_cursor(&edited), Err(JournalError::InvalidCursor)));
    assert!(matches!(j.seek_cursor(&edited), Err(JournalError::InvalidCursor)));

    let garbage: Cursor = "not a cursor".parse().unwrap();
    assert!(matches!(j.test_cursor(&garbage), Err(JournalError::InvalidCursor)));
}

#[test]
fn cursors_survive_a_new_session() {
    let backend = MemoryBackend::new().with_source(system(6));
    let mut j = open(backend.clone());
    j.move_to_earliest().unwrap();
    j.skip(4).unwrap();
    let saved = j.cursor().unwrap().to_string();
    let message = j.read_message().unwrap();
    j.close();

    let mut j = open(backend);
    let cursor: Cursor = saved.parse().unwrap();
    assert!(j.seek_cursor(&cursor).unwrap());
    assert_eq!(j.read_message().unwrap(), message);
}

#[test]
fn filters_narrow_and_reset_restores() {
    let mut j = open(MemoryBackend::new().with_source(system(12)));
    let all = count_forward(&mut j);

    j.add_field_match(JournalField::SystemdUnit, "a.service").unwrap();
    assert_eq!(count_forward(&mut j), 6);

    j.add_match_str("PRIORITY", "3").unwrap();
    // Entries 0 and 6 are both on a.service and at priority 3.
    assert_eq!(count_forward(&mut j), 2);

    j.reset_filters().unwrap();
    assert_eq!(count_forward(&mut j), all);
}

#[test]
fn disjunctions_widen_the_filter() {
    let mut j = open(MemoryBackend::new().with_source(system(12)));

    j.add_match_str("PRIORITY", "3").unwrap();
    j.add_disjunction().unwrap();
    j.add_field_match(JournalField::SystemdUnit, "b.service").unwrap();
    // Priority 3: 0, 3, 6, 9. Unit b: 1, 3, 5, 7, 9, 11.
    assert_eq!(count_forward(&mut j), 8);

    j.add_conjunction().unwrap();
    j.add_match_str("PRIORITY", "6").unwrap();
    // (priority 3 OR unit b) AND priority 6: 1, 5, 7, 11.
    assert_eq!(count_forward(&mut j), 4);
}

#[test]
fn operators_without_terms_fail() {
    let mut j = open(MemoryBackend::new().with_source(system(2)));
    assert!(matches!(j.add_disjunction(), Err(JournalError::NoFilterDefined)));
    assert!(matches!(j.add_conjunction(), Err(JournalError::NoFilterDefined)));
}

#[test]
fn byte_and_string_reads_agree() {
    let mut j = open(MemoryBackend::new().with_source(system(4)));
    j.move_to_earliest().unwrap();
    while j.move_to_next().unwrap() {
        for field in ["MESSAGE", "PRIORITY", "_SYSTEMD_UNIT"] {
            let bytes = j.read_bytes(field).unwrap();
            let text = j.read_string(field).unwrap();
            assert_eq!(bytes, text.as_bytes());
            assert_eq!(j.data_size(field).unwrap(), field.len() + 1 + bytes.len());
        }
        assert_eq!(
            j.read_field_bytes(JournalField::SystemdUnit).unwrap(),
            j.read_bytes("_SYSTEMD_UNIT").unwrap()
        );
    }
}

#[test]
fn missing_fields_are_told_apart() {
    let source = MemorySource::new(Origin::System).entries([
        MemoryEntry::new(1).field("MESSAGE", "first").field("CODE_LINE", "12"),
        MemoryEntry::new(2).field("MESSAGE", "second"),
    ]);
    let mut j = open(MemoryBackend::new().with_source(source));
    j.move_to_earliest().unwrap();
    j.skip(2).unwrap();

    assert!(matches!(
        j.data_size("CODE_LINE"),
        Err(JournalError::FieldEmpty(f)) if f == "CODE_LINE"
    ));
    assert!(matches!(j.data_size("NO_SUCH_FIELD"), Err(JournalError::NoSuchField(_))));
}

#[test]
fn batch_reads_record_absent_fields_and_keep_partial_results() {
    let source = MemorySource::new(Origin::System).entries([
        MemoryEntry::new(1).field("MESSAGE", "hello").field("PRIORITY", "5"),
        MemoryEntry::new(2).field("SYSLOG_IDENTIFIER", "sshd"),
    ]);
    let mut j = open(MemoryBackend::new().with_source(source));
    j.move_to_next().unwrap();

    let mut values = BTreeMap::new();
    j.read_fields_as_strings(["MESSAGE", "SYSLOG_IDENTIFIER"], &mut values)
        .unwrap();
    assert_eq!(values["MESSAGE"].as_deref(), Some("hello"));
    assert_eq!(values["SYSLOG_IDENTIFIER"], None);

    let mut values = HashMap::new();
    let err = j
        .read_fields_as_strings(["PRIORITY", "bad name", "MESSAGE"], &mut values)
        .unwrap_err();
    assert!(matches!(err, JournalError::InvalidFieldName(_)));
    assert_eq!(values.len(), 1);
    assert_eq!(values["PRIORITY"].as_deref(), Some("5"));

    let mut fields = Vec::new();
    j.read_journal_fields(
        [JournalField::Message, JournalField::SyslogIdentifier],
        &mut fields,
    )
    .unwrap();
    assert_eq!(
        fields,
        [
            (JournalField::Message, Some("hello".to_owned())),
            (JournalField::SyslogIdentifier, None)
        ]
    );
}

#[test]
fn range_scan_visits_at_most_the_limit() {
    let mut j = open(MemoryBackend::new().with_source(system(20)));
    let mut messages = Vec::new();
    let n = j
        .for_each_in_range(None, None, 5, |j| {
            messages.push(j.read_message()?);
            Ok::<_, JournalError>(())
        })
        .unwrap();
    assert_eq!(n, 5);
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[0], "message 0");
}

#[test]
fn range_scan_honours_the_window() {
    let mut j = open(MemoryBackend::new().with_source(system(20)));
    let n = j
        .for_each_in_range(
            Some(Microseconds(3_000_000)),
            Some(Microseconds(8_000_000)),
            100,
            |_| Ok::<_, JournalError>(()),
        )
        .unwrap();
    assert_eq!(n, 5);
}

#[test]
fn earliest_time_across_interleaved_sources() {
    let backend = MemoryBackend::new()
        .with_source(MemorySource::new(Origin::System).entries([
            MemoryEntry::new(10).field("MESSAGE", "s10"),
            MemoryEntry::new(20).field("MESSAGE", "s20"),
            MemoryEntry::new(30).field("MESSAGE", "s30"),
        ]))
        .with_source(MemorySource::new(Origin::User).entries([
            MemoryEntry::new(20).field("MESSAGE", "u20"),
            MemoryEntry::new(20).field("MESSAGE", "u20b"),
        ]));
    let mut j = open(backend);

    j.move_to_latest().unwrap();
    assert!(j.move_backward_until_earliest_time(25u64).unwrap());
    assert_eq!(j.timestamp_usec().unwrap(), Microseconds(20));
    assert!(j.move_to_previous().unwrap());
    assert_eq!(j.timestamp_usec().unwrap(), Microseconds(10));

    j.move_to_latest().unwrap();
    assert!(j.move_backward_until_latest_time(25u64).unwrap());
    assert_eq!(j.timestamp_usec().unwrap(), Microseconds(20));
    assert!(j.move_to_next().unwrap());
    assert_eq!(j.timestamp_usec().unwrap(), Microseconds(30));

    j.move_to_earliest().unwrap();
    assert!(j.move_forward_until_time(15u64).unwrap());
    assert_eq!(j.timestamp_usec().unwrap(), Microseconds(20));
    assert!(!j.move_forward_until_time(31u64).unwrap());
}

#[test]
fn closed_journals_refuse_every_operation() {
    let mut j = open(MemoryBackend::new().with_source(system(3)));
    let cursor = {
        j.move_to_next().unwrap();
        j.cursor().unwrap()
    };
    j.close();

    assert!(matches!(j.move_to_next(), Err(JournalError::Closed)));
    assert!(matches!(j.skip(1), Err(JournalError::Closed)));
    assert!(matches!(j.test_cursor(&cursor), Err(JournalError::Closed)));
    assert!(matches!(j.read_message(), Err(JournalError::Closed)));
    assert!(matches!(j.add_match_str("A", "b"), Err(JournalError::Closed)));
    assert!(matches!(j.cutoff(), Err(JournalError::Closed)));
    assert!(matches!(j.usage(), Err(JournalError::Closed)));
}

#[test]
fn empty_journals_have_no_cutoff() {
    let mut j = open(MemoryBackend::new());
    assert!(matches!(j.cutoff(), Err(JournalError::NoEntries)));
    assert!(!j.move_to_next().unwrap());
    assert_eq!(
        j.for_each_in_range(None, None, 10, |_| Ok::<_, JournalError>(()))
            .unwrap(),
        0
    );
}

#[test]
fn journal_wide_queries() {
    let backend = MemoryBackend::new()
        .with_source(system(3))
        .with_source(MemorySource::new(Origin::User).runtime().entry(
            MemoryEntry::new(9).field("CUSTOM_FIELD", "x"),
        ));
    let mut j = open(backend);

    let period = j.cutoff().unwrap();
    assert_eq!(period.from, Microseconds(9));
    assert_eq!(period.until, Microseconds(3_000_000));

    let names = j.available_field_names().unwrap();
    assert!(names.contains("CUSTOM_FIELD"));
    assert!(names.contains("_SYSTEMD_UNIT"));

    let fields = j.available_fields().unwrap();
    assert!(fields.contains(&JournalField::Message));
    assert!(fields.contains(&JournalField::SystemdUnit));
    assert_eq!(fields.len(), 3);

    assert!(j.usage().unwrap() > 0);
    assert!(j.has_runtime_files().unwrap());
    assert!(j.has_persistent_files().unwrap());
}

#[test]
fn local_timestamps_use_the_configured_offset() {
    let mut j = open(MemoryBackend::new().with_source(system(1)));
    j.move_to_next().unwrap();

    let offset = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
    j.set_utc_offset(offset);
    let local = j.timestamp_local().unwrap();
    assert_eq!(local.offset(), &offset);
    assert_eq!(local.timestamp(), 1);
    assert_eq!(j.timestamp().unwrap().timestamp(), 1);
}
