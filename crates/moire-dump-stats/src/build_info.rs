/// Captures build metadata of the crate that invokes the macro.
///
/// Package name and version come from Cargo. The git revision and rustc
/// version are picked up when the build sets `MOIRE_DUMP_GIT_REVISION` and
/// `MOIRE_DUMP_RUSTC_VERSION` (typically from a build script).
///
/// ```rust,ignore
/// let stats = moire_dump_stats::ProcessStats::new()
///     .with_build_info(moire_dump_stats::build_info!());
/// ```
#[macro_export]
macro_rules! build_info {
    () => {{
        let mut build =
            $crate::BuildSnapshot::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        build.target = Some(format!(
            "{}-{}",
            ::std::env::consts::ARCH,
            ::std::env::consts::OS
        ));
        build.profile = Some(
            if cfg!(debug_assertions) { "debug" } else { "release" }.to_string(),
        );
        build.git_revision = option_env!("MOIRE_DUMP_GIT_REVISION").map(str::to_string);
        build.rustc = option_env!("MOIRE_DUMP_RUSTC_VERSION").map(str::to_string);
        build
    }};
}
