//! Closing, failure handling and stream views of the buffered store.

use bistore_testkit::prelude::*;
use std::io::{Read, Write};

fn probe_store(data: &[u8]) -> (BufferedStore<ProbeStore>, ProbeHandle) {
    let (probe, handle) = ProbeStore::with_data(data.to_vec());
    (BufferedStore::new(probe), handle)
}

#[test]
fn close_in_write_mode_writes_before_closing_store() {
    let (mut store, handle) = probe_store(b"");
    store.write(b"pending").unwrap();
    store.close().unwrap();

    let events = handle.events();
    assert_eq!(
        events,
        vec![
            ProbeEvent::Write {
                position: 0,
                data: b"pending".to_vec()
            },
            ProbeEvent::Close,
        ]
    );
    assert_eq!(handle.contents(), b"pending");
}

#[test]
fn close_in_read_mode_closes_store_once() {
    let (mut store, handle) = probe_store(b"abcdef");
    assert_eq!(store.read_byte().unwrap(), b'a');
    handle.clear_events();

    store.close().unwrap();
    assert_eq!(handle.events(), vec![ProbeEvent::Close]);
    assert!(store.is_closed());
}

#[test]
fn close_after_switch_emits_then_closes_once() {
    let (mut store, handle) = probe_store(b"0123456789");
    assert_eq!(store.read_byte().unwrap(), b'0');
    store.write(b"ab").unwrap();
    handle.clear_events();

    store.close().unwrap();
    assert_eq!(
        handle.events(),
        vec![
            ProbeEvent::Write {
                position: 1,
                data: b"ab".to_vec()
            },
            ProbeEvent::Close,
        ]
    );
    assert_eq!(handle.contents(), b"0ab3456789");
}

#[test]
fn close_is_idempotent() {
    let (mut store, handle) = probe_store(b"");
    store.write(b"x").unwrap();
    store.close().unwrap();
    store.close().unwrap();
    drop(store);
    assert_eq!(handle.close_count(), 1);
    assert_eq!(handle.writes().len(), 1);
}

#[test]
fn operations_after_close_fail() {
    let (mut store, _handle) = probe_store(b"abc");
    store.close().unwrap();

    assert!(store.read_byte().unwrap_err().is_closed());
    assert!(store.write(b"x").unwrap_err().is_closed());
    assert!(store.seek(0).unwrap_err().is_closed());
    assert!(store.tell().unwrap_err().is_closed());
    assert!(store.size().unwrap_err().is_closed());
    assert!(store.flush().unwrap_err().is_closed());
}

#[test]
fn close_reports_first_failure_and_still_closes_store() {
    let (mut store, handle) = probe_store(b"");
    store.write(b"doomed").unwrap();
    handle.fail(Fault::Write);
    handle.fail(Fault::Close);

    let err = store.close().unwrap_err();
    assert!(err.to_string().contains("injected Write failure"), "{err}");
    assert!(store.is_closed());
    assert!(handle.is_closed());
    assert_eq!(handle.close_count(), 1);
}

#[test]
fn close_failure_alone_is_reported() {
    let (mut store, handle) = probe_store(b"");
    store.write(b"kept").unwrap();
    handle.fail(Fault::Close);

    let err = store.close().unwrap_err();
    assert!(err.to_string().contains("injected Close failure"), "{err}");
    assert_eq!(handle.contents(), b"kept");
}

#[test]
fn drop_closes_and_persists() {
    let (probe, handle) = ProbeStore::new();
    {
        let mut store = BufferedStore::new(probe);
        store.write_utf8("dropped").unwrap();
    }
    assert_eq!(handle.contents(), b"dropped");
    assert!(handle.is_closed());
}

#[test]
fn drop_swallows_close_failure() {
    let (probe, handle) = ProbeStore::new();
    handle.fail(Fault::Close);
    {
        let mut store = BufferedStore::new(probe);
        store.write_utf8("still here").unwrap();
    }
    assert_eq!(handle.contents(), b"still here");
    assert_eq!(handle.close_count(), 1);
}

#[test]
fn failed_emit_keeps_pending_bytes_and_mode() {
    let (mut store, handle) = probe_store(b"");
    store.write(b"abc").unwrap();
    handle.fail(Fault::Write);

    assert!(store.read_byte().is_err());
    assert_eq!(store.mode(), Mode::Write);
    assert_eq!(store.buffer().as_slice(), b"abc");

    handle.heal(Fault::Write);
    store.seek(0).unwrap();
    assert_eq!(store.read_utf8().unwrap(), "abc");
}

#[test]
fn failed_rewind_keeps_read_ahead() {
    let (mut store, handle) = probe_store(b"0123456789");
    assert_eq!(store.read_byte().unwrap(), b'0');
    handle.fail(Fault::Seek);

    assert!(store.write(b"x").is_err());
    assert_eq!(store.mode(), Mode::Read);
    assert_eq!(store.tell().unwrap(), 1);

    handle.heal(Fault::Seek);
    store.write(b"x").unwrap();
    store.flush().unwrap();
    assert_eq!(handle.contents(), b"0x23456789");
}

#[test]
fn failed_flush_is_reported() {
    let (mut store, handle) = probe_store(b"");
    handle.fail(Fault::Flush);
    store.write(b"abc").unwrap();

    assert!(store.flush().is_err());
    // Emitting happens before the store flush.
    assert_eq!(handle.contents(), b"abc");
}

#[test]
fn writer_close_cascades_to_store() {
    let (mut store, handle) = probe_store(b"");
    {
        let mut writer = store.writer();
        writer.write_all(b"through the view").unwrap();
        writer.close().unwrap();
    }
    assert!(store.is_closed());
    assert!(handle.is_closed());
    assert_eq!(handle.contents(), b"through the view");
}

#[test]
fn reader_close_emits_and_cascades() {
    let (mut store, handle) = probe_store(b"");
    store.write(b"emitted on switch").unwrap();
    store.reader().close().unwrap();

    assert!(handle.is_closed());
    assert_eq!(handle.contents(), b"emitted on switch");
    assert_eq!(handle.close_count(), 1);
}

#[test]
fn views_interleave_with_direct_calls() {
    let (mut store, handle) = probe_store(b"hello world");
    let mut word = [0u8; 5];
    store.reader().read_exact(&mut word).unwrap();
    assert_eq!(&word, b"hello");

    write!(store.writer(), "_").unwrap();
    assert_eq!(store.read_utf8().unwrap(), "world");
    store.close().unwrap();
    assert_eq!(handle.contents(), b"hello_world");
}

#[test]
fn file_store_close_flushes_to_disk() {
    let (mut store, guard) = TempFileStore::with_data(b"base").buffered(tiny_config());
    store.seek(4).unwrap();
    store.write_utf8("+tail").unwrap();
    store.close().unwrap();
    assert_eq!(guard.contents(), b"base+tail");
}
