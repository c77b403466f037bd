use facet::Facet;
use figue as args;
use moire_dump::{
    ConsoleSink, CountingAllocator, DebugRequest, DiagnosticError, JsonLinesSink, LEVEL_ENV,
    ProcessStats, Selectors, Sink, TracingSink, emit,
};
use tracing::debug;

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator::system();

const DEFAULT_MESSAGE: &str = "moire-dump";
const DEFAULT_LEVEL: &str = "INFO";

#[derive(Facet, Debug)]
struct Cli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    /// Selector tags, e.g. `MEM` or `MEM,GC`. Falls back to `MOIRE_DUMP_LEVEL`.
    #[facet(args::named, default)]
    level: Option<String>,
    #[facet(args::named, default)]
    message: Option<String>,
    /// `console` (default), `log` or `json`.
    #[facet(args::named, default)]
    sink: Option<String>,
    #[facet(args::named, default)]
    banners: bool,
    /// Attach the call site to each log record (`log` sink only).
    #[facet(args::named, default)]
    caller: bool,
}

enum SinkKind {
    Console,
    Log,
    Json,
}

impl SinkKind {
    fn parse(value: Option<&str>) -> Result<Self, String> {
        match value.unwrap_or("console") {
            "console" => Ok(Self::Console),
            "log" => Ok(Self::Log),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown sink {other:?}; expected console, log or json")),
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = parse_cli()?;
    let sink_kind = SinkKind::parse(cli.sink.as_deref())?;

    if matches!(sink_kind, SinkKind::Log) {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let tags = cli
        .level
        .or_else(|| std::env::var(LEVEL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    let selectors = Selectors::parse(&tags).map_err(|e| DiagnosticError::from(e).to_string())?;
    let message = cli.message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
    let request = DebugRequest::new(selectors, message);
    let stats = ProcessStats::new().with_build_info(moire_dump::build_info!());
    debug!(?selectors, "running dump");

    let mut sink: Box<dyn Sink> = match sink_kind {
        SinkKind::Console => Box::new(ConsoleSink::stdout().with_banners(cli.banners)),
        SinkKind::Log => Box::new(TracingSink::new().with_caller(cli.caller)),
        SinkKind::Json => Box::new(JsonLinesSink::new(std::io::stdout())),
    };
    emit(&request, &stats, &mut sink).map_err(|e| e.to_string())
}

fn parse_cli() -> Result<Cli, String> {
    let figue_config = args::builder::<Cli>()
        .map_err(|e| format!("failed to build CLI schema: {e}"))?
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name("moire-dump")
                .description("Print a runtime diagnostic dump of this process")
                .version(option_env!("CARGO_PKG_VERSION").unwrap_or("dev"))
        })
        .build();
    let cli = args::Driver::new(figue_config)
        .run()
        .into_result()
        .map_err(|e| e.to_string())?;
    Ok(cli.value)
}
