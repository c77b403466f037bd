//! Allocator and stack figures the OS or libc can report on their own.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct HeapFigures {
    pub sys: u64,
    pub inuse: u64,
    pub idle: u64,
    pub released: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StackFigures {
    pub inuse: Option<u64>,
    pub sys: Option<u64>,
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
pub(crate) fn heap_figures() -> Option<HeapFigures> {
    // SAFETY: mallinfo2 takes no arguments and returns a plain struct.
    let info = unsafe { libc::mallinfo2() };
    let mmapped = info.hblkhd as u64;
    Some(HeapFigures {
        sys: info.arena as u64 + mmapped,
        inuse: info.uordblks as u64 + mmapped,
        idle: info.fordblks as u64,
        // glibc keeps no count of trimmed bytes.
        released: 0,
    })
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
pub(crate) fn heap_figures() -> Option<HeapFigures> {
    None
}

#[cfg(target_os = "linux")]
pub(crate) fn stack_figures() -> StackFigures {
    match std::fs::read_to_string("/proc/self/status") {
        Ok(status) => parse_proc_status(&status),
        Err(_) => StackFigures::default(),
    }
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn stack_figures() -> StackFigures {
    StackFigures::default()
}

/// `VmStk` is the main thread's mapped stack. Linux does not report how much
/// of it is touched, so `inuse` stays empty.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn parse_proc_status(status: &str) -> StackFigures {
    let sys = status.lines().find_map(|line| {
        let rest = line.strip_prefix("VmStk:")?;
        let kib = rest.trim().strip_suffix("kB")?.trim().parse::<u64>().ok()?;
        Some(kib * 1024)
    });
    StackFigures { inuse: None, sys }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vmstk() {
        let status = "Name:\tcat\nVmRSS:\t    1024 kB\nVmStk:\t     132 kB\nVmExe:\t 20 kB\n";
        assert_eq!(
            parse_proc_status(status),
            StackFigures {
                inuse: None,
                sys: Some(132 * 1024)
            }
        );
    }

    #[test]
    fn missing_vmstk_is_none() {
        assert_eq!(parse_proc_status("Name:\tcat\n"), StackFigures::default());
    }
}
