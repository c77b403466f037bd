//! Snapshot → records. Field names and order here are the stable output shape.

use moire_dump_types::{Group, GcSnapshot, MemorySnapshot, Record, RuntimeSnapshot, Selectors};
use std::time::Duration;

/// Every record a dump of `snapshot` produces for `selectors`, message first.
pub fn records(message: &str, selectors: Selectors, snapshot: &RuntimeSnapshot) -> Vec<Record> {
    let mut out = vec![Record::message(message)];
    for group in Group::ALL {
        if !selectors.includes(group) {
            continue;
        }
        match group {
            Group::Stack => out.push(Record::stat(
                Group::Stack,
                "Stack Trace",
                snapshot.stack.as_str().trim_end(),
            )),
            Group::Memory => memory(&snapshot.memory, &mut out),
            Group::Gc => gc(&snapshot.gc, &mut out),
            Group::Build => {
                if let Some(build) = &snapshot.build {
                    out.push(Record::stat(Group::Build, "Build Info", build.to_string()));
                }
            }
        }
    }
    out
}

fn bytes(n: u64) -> String {
    format!("{n} bytes")
}

fn memory(mem: &MemorySnapshot, out: &mut Vec<Record>) {
    let stat = |key: &str, value: String| Record::stat(Group::Memory, key, value);
    out.push(stat("Alloc", bytes(mem.alloc)));
    out.push(stat("TotalAlloc", bytes(mem.total_alloc)));
    out.push(stat("HeapAlloc", bytes(mem.heap_alloc)));
    out.push(stat("HeapSys", bytes(mem.heap_sys)));
    out.push(stat("HeapIdle", bytes(mem.heap_idle)));
    out.push(stat("HeapInuse", bytes(mem.heap_inuse)));
    out.push(stat("HeapReleased", bytes(mem.heap_released)));
    out.push(stat("HeapObjects", mem.heap_objects.to_string()));
    if let Some(stack_inuse) = mem.stack_inuse {
        out.push(stat("StackInUse", bytes(stack_inuse)));
    }
    if let Some(stack_sys) = mem.stack_sys {
        out.push(stat("StackSys", bytes(stack_sys)));
    }
    out.push(stat("NumGC", mem.num_gc.to_string()));
}

fn gc(gc: &GcSnapshot, out: &mut Vec<Record>) {
    let stat = |key: &str, value: String| Record::stat(Group::Gc, key, value);
    out.push(stat(
        "LastGC",
        gc.last_gc_ns.map_or_else(|| "never".to_string(), timestamp),
    ));
    out.push(stat("NumGC", gc.num_gc.to_string()));
    out.push(stat("PauseTotal", format!("{:?}", gc.pause_total())));
    out.push(stat(
        "Pause",
        gc.last_pause()
            .map_or_else(|| "none".to_string(), |pause| format!("{pause:?}")),
    ));
    out.push(stat("PauseEnd", list(&gc.pause_end_ns, timestamp)));
    out.push(stat(
        "PauseQuantiles",
        list(&gc.pause_quantiles_ns, |ns| format!("{:?}", Duration::from_nanos(ns))),
    ));
}

/// Unix time as `seconds.nanoseconds`.
fn timestamp(unix_ns: u64) -> String {
    format!("{}.{:09}", unix_ns / 1_000_000_000, unix_ns % 1_000_000_000)
}

fn list(values: &[u64], render: impl Fn(u64) -> String) -> String {
    let items: Vec<String> = values.iter().copied().map(render).collect();
    format!("[{}]", items.join(" "))
}
