use super::*;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn fixture() -> RuntimeSnapshot {
    let mut build = BuildSnapshot::new("demo", "0.1.0");
    build.profile = Some("debug".into());
    RuntimeSnapshot {
        captured_at_ns: 1_700_000_000_000_000_000,
        stack: StackSnapshot::new(concat!(
            "my_app::handler\n",
            "    src/handler.rs:42\n",
            "my_app::main\n",
            "    src/main.rs:7\n",
        )),
        memory: MemorySnapshot {
            alloc: 1024,
            total_alloc: 4096,
            heap_alloc: 1024,
            heap_sys: 8192,
            heap_idle: 2048,
            heap_inuse: 6144,
            heap_released: 0,
            heap_objects: 12,
            stack_inuse: None,
            stack_sys: Some(135_168),
            num_gc: 2,
        },
        gc: GcSnapshot {
            last_gc_ns: Some(1_700_000_000_500_000_000),
            num_gc: 2,
            pause_total_ns: 3_000_000,
            pause_ns: vec![2_000_000, 1_000_000],
            pause_end_ns: vec![1_700_000_000_500_000_000, 1_699_999_999_000_000_000],
            pause_quantiles_ns: vec![1_000_000, 1_000_000, 2_000_000, 2_000_000, 2_000_000],
        },
        build: Some(build),
    }
}

fn without_build() -> RuntimeSnapshot {
    RuntimeSnapshot {
        build: None,
        ..fixture()
    }
}

/// Counts how often the snapshot was taken.
struct CountingStats {
    inner: FixedStats,
    calls: AtomicUsize,
}

impl CountingStats {
    fn new(snapshot: RuntimeSnapshot) -> Self {
        Self {
            inner: FixedStats(snapshot),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RuntimeStatsProvider for CountingStats {
    fn snapshot(&self) -> RuntimeSnapshot {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.snapshot()
    }
}

/// Accepts `accept` records, then refuses.
struct FailingSink {
    accept: usize,
    written: Vec<Record>,
}

impl Sink for FailingSink {
    fn record(&mut self, record: &Record, _cx: &EmitContext) -> io::Result<()> {
        if self.written.len() == self.accept {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        self.written.push(record.clone());
        Ok(())
    }
}

fn dump(selectors: Selectors, snapshot: RuntimeSnapshot) -> CollectingSink {
    let mut sink = CollectingSink::new();
    emit(
        &DebugRequest::new(selectors, "checkpoint A"),
        &FixedStats(snapshot),
        &mut sink,
    )
    .expect("dump must succeed");
    sink
}

fn groups(sink: &CollectingSink) -> Vec<Option<Group>> {
    let mut groups: Vec<Option<Group>> = sink.records().iter().map(|r| r.group).collect();
    groups.dedup();
    groups
}

#[test]
fn unknown_tag_is_rejected_before_any_output() {
    let stats = CountingStats::new(fixture());
    let mut sink = CollectingSink::new();
    let err = emit_tagged(true, "bogus", "x", &stats, &mut sink)
        .expect_err("bogus must be rejected");
    assert!(matches!(&err, DiagnosticError::InvalidSelector(tag) if tag == "bogus"));
    assert_eq!(err.to_string(), "invalid debug option: bogus");
    assert!(sink.is_empty());
    assert_eq!(stats.calls(), 0);
}

#[test]
fn disabled_is_a_noop_even_with_an_unknown_tag() {
    let stats = CountingStats::new(fixture());
    let mut sink = CollectingSink::new();
    emit_tagged(false, "bogus", "x", &stats, &mut sink).expect("disabled must succeed");
    emit(&DebugRequest::disabled("x"), &stats, &mut sink).expect("disabled must succeed");
    emit(
        &DebugRequest::new(Selector::All, "x").with_enabled(false),
        &stats,
        &mut sink,
    )
    .expect("disabled must succeed");
    assert!(sink.is_empty());
    assert_eq!(stats.calls(), 0);
}

#[test]
fn info_emits_only_the_message() {
    for selectors in [Selectors::from(Selector::Info), Selectors::empty()] {
        let sink = dump(selectors, fixture());
        assert_eq!(sink.records(), &[Record::message("checkpoint A")]);
    }
}

#[test]
fn memory_stats_emit_message_then_memory_fields_in_order() {
    let sink = dump(Selector::MemoryStats.into(), fixture());
    assert_eq!(
        sink.keys(),
        [
            "message",
            "Alloc",
            "TotalAlloc",
            "HeapAlloc",
            "HeapSys",
            "HeapIdle",
            "HeapInuse",
            "HeapReleased",
            "HeapObjects",
            "StackSys",
            "NumGC",
        ]
    );
    assert_eq!(sink.records()[0].value, "checkpoint A");
    assert_eq!(groups(&sink), [None, Some(Group::Memory)]);
}

#[test]
fn gc_stats_fields() {
    let sink = dump(Selector::GcStats.into(), fixture());
    assert_eq!(
        sink.keys(),
        ["message", "LastGC", "NumGC", "PauseTotal", "Pause", "PauseEnd", "PauseQuantiles"]
    );
}

#[test]
fn stack_trace_is_one_preformatted_record() {
    let sink = dump(Selector::StackTrace.into(), fixture());
    assert_eq!(sink.keys(), ["message", "Stack Trace"]);
    assert!(sink.records()[1].value.starts_with("my_app::handler\n"));
}

#[test]
fn all_covers_every_single_group() {
    let all = dump(Selector::All.into(), fixture());
    assert_eq!(
        groups(&all),
        [
            None,
            Some(Group::Stack),
            Some(Group::Memory),
            Some(Group::Gc),
            Some(Group::Build)
        ]
    );
    for selector in [
        Selector::Info,
        Selector::StackTrace,
        Selector::MemoryStats,
        Selector::GcStats,
        Selector::BuildInfo,
    ] {
        let single = dump(selector.into(), fixture());
        for record in single.records() {
            assert!(all.records().contains(record), "{selector}: missing {record:?}");
        }
    }
}

#[test]
fn missing_build_info_is_skipped_silently() {
    let sink = dump(Selector::BuildInfo.into(), without_build());
    assert_eq!(sink.keys(), ["message"]);

    let all = dump(Selector::All.into(), without_build());
    assert!(!all.keys().contains(&"Build Info"));
}

#[test]
fn build_info_is_one_record() {
    let sink = dump(Selector::BuildInfo.into(), fixture());
    assert_eq!(sink.keys(), ["message", "Build Info"]);
    assert_eq!(
        sink.records()[1].value,
        "package\tdemo\nversion\t0.1.0\nprofile\tdebug"
    );
}

#[test]
fn snapshot_is_taken_once_per_call() {
    let stats = CountingStats::new(fixture());
    let mut sink = CollectingSink::new();
    emit(&DebugRequest::new(Selector::All, "x"), &stats, &mut sink).expect("dump must succeed");
    assert_eq!(stats.calls(), 1);
}

#[test]
fn sink_failure_aborts_remaining_records() {
    let mut sink = FailingSink {
        accept: 2,
        written: Vec::new(),
    };
    let err = emit(
        &DebugRequest::new(Selector::MemoryStats, "checkpoint A"),
        &FixedStats(fixture()),
        &mut sink,
    )
    .expect_err("third record must fail");
    let DiagnosticError::SinkWrite(io_err) = &err else {
        panic!("expected SinkWrite, got {err:?}");
    };
    assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(sink.written.len(), 2);
}

#[test]
fn field_names_and_order_are_stable_across_calls() {
    let stats = ProcessStats::new();
    let request = DebugRequest::new(Selector::All, "again");
    let mut first = CollectingSink::new();
    let mut second = CollectingSink::new();
    emit(&request, &stats, &mut first).expect("first dump");
    emit(&request, &stats, &mut second).expect("second dump");
    assert_eq!(first.keys(), second.keys());
    assert!(first.keys().contains(&"Stack Trace"));
    assert!(!first.keys().contains(&"Build Info"));
}

#[test]
fn caller_is_the_emit_call_site() {
    struct CallerSink(Option<&'static str>);

    impl Sink for CallerSink {
        fn record(&mut self, _record: &Record, cx: &EmitContext) -> io::Result<()> {
            self.0 = Some(cx.caller.file());
            Ok(())
        }
    }

    let mut sink = CallerSink(None);
    emit(&DebugRequest::new(Selector::Info, "x"), &FixedStats(fixture()), &mut sink)
        .expect("dump must succeed");
    assert!(sink.0.expect("caller was recorded").ends_with("tests.rs"));
}

#[test]
fn concurrent_callers_get_independent_dumps() {
    let stats = Arc::new(FixedStats(fixture()));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let stats = Arc::clone(&stats);
            std::thread::spawn(move || {
                let mut sink = CollectingSink::new();
                emit(
                    &DebugRequest::new(Selector::MemoryStats, format!("thread {i}")),
                    &stats,
                    &mut sink,
                )
                .expect("dump must succeed");
                sink.into_records()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let records = handle.join().expect("thread must not panic");
        assert_eq!(records[0].value, format!("thread {i}"));
        assert_eq!(records.len(), 11);
    }
}

#[test]
fn console_renders_key_value_lines() {
    let mut sink = ConsoleSink::new(Vec::new());
    emit(
        &DebugRequest::new(Selectors::MEMORY | Selectors::GC, "checkpoint A"),
        &FixedStats(fixture()),
        &mut sink,
    )
    .expect("dump must succeed");
    let out = String::from_utf8(sink.into_inner()).expect("console output is utf-8");
    insta::assert_snapshot!(out, @r"
    checkpoint A
    Alloc: 1024 bytes
    TotalAlloc: 4096 bytes
    HeapAlloc: 1024 bytes
    HeapSys: 8192 bytes
    HeapIdle: 2048 bytes
    HeapInuse: 6144 bytes
    HeapReleased: 0 bytes
    HeapObjects: 12
    StackSys: 135168 bytes
    NumGC: 2
    LastGC: 1700000000.500000000
    NumGC: 2
    PauseTotal: 3ms
    Pause: 2ms
    PauseEnd: [1700000000.500000000 1699999999.000000000]
    PauseQuantiles: [1ms 1ms 2ms 2ms 2ms]
    ");
}

#[test]
fn console_puts_multiline_values_under_their_key() {
    let mut sink = ConsoleSink::new(Vec::new());
    emit(
        &DebugRequest::new(Selector::StackTrace, "where"),
        &FixedStats(fixture()),
        &mut sink,
    )
    .expect("dump must succeed");
    let out = String::from_utf8(sink.into_inner()).expect("console output is utf-8");
    assert_eq!(
        out,
        concat!(
            "where\n",
            "Stack Trace:\n",
            "my_app::handler\n",
            "    src/handler.rs:42\n",
            "my_app::main\n",
            "    src/main.rs:7\n",
        )
    );
}

#[test]
fn console_banners_frame_the_dump() {
    let mut sink = ConsoleSink::new(Vec::new()).with_banners(true);
    emit(&DebugRequest::new(Selector::Info, "hello"), &FixedStats(fixture()), &mut sink)
        .expect("dump must succeed");
    let out = String::from_utf8(sink.into_inner()).expect("console output is utf-8");
    assert_eq!(out, "\nStart debug...\nhello\n\nFinish debug...\n");
}

#[test]
fn json_lines_sink_writes_one_object_per_record() {
    let mut sink = JsonLinesSink::new(Vec::new());
    emit(
        &DebugRequest::new(Selector::MemoryStats, "checkpoint A"),
        &FixedStats(fixture()),
        &mut sink,
    )
    .expect("dump must succeed");
    let out = String::from_utf8(sink.into_inner()).expect("json output is utf-8");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 11);
    assert!(lines.iter().all(|line| line.starts_with('{') && line.ends_with('}')));
    assert!(lines[0].contains("checkpoint A"));
    assert!(lines[1].contains("Alloc"));
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("buffer mutex poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn tracing_sink_attributes_records_to_the_caller() {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut sink = TracingSink::new().with_caller(true);
        emit(
            &DebugRequest::new(Selector::MemoryStats, "checkpoint A"),
            &FixedStats(fixture()),
            &mut sink,
        )
        .expect("dump must succeed");
    });

    let out = String::from_utf8(buf.0.lock().expect("buffer mutex poisoned").clone())
        .expect("log output is utf-8");
    assert_eq!(out.lines().count(), 11);
    assert!(out.contains("checkpoint A"));
    assert!(out.contains("HeapObjects: 12"));
    assert!(out.contains("group=\"memory\""));
    assert!(out.contains("tests.rs:"));
}

#[test]
fn tracing_sink_respects_level() {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut sink = TracingSink::new().with_level(tracing::Level::DEBUG);
        emit(
            &DebugRequest::new(Selector::MemoryStats, "quiet"),
            &FixedStats(fixture()),
            &mut sink,
        )
        .expect("dump must succeed");
    });

    assert!(buf.0.lock().expect("buffer mutex poisoned").is_empty());
}
