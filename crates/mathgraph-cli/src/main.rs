use futures::executor::block_on;
use mathgraph::render::{
    Capabilities, ImageRequest, LayeredLayout, LayoutOptions, RankDir, RenderSession, SymbolLookup,
};
use mathgraph::{Correspondence, ExprNode, RenderConfig, parse_correspondences, parse_mathml};
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(mathgraph::Error),
    Render(mathgraph::render::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<mathgraph::Error> for CliError {
    fn from(value: mathgraph::Error) -> Self {
        Self::Core(value)
    }
}

impl From<mathgraph::render::Error> for CliError {
    fn from(value: mathgraph::render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Render,
    Compare,
    Summary,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    inputs: Vec<String>,
    matches: Option<String>,
    config: Option<String>,
    apply_form: bool,
    headless: bool,
    image_template: Option<String>,
    rankdir: RankDir,
    nodesep: Option<f64>,
    ranksep: Option<f64>,
    pretty: bool,
    verbose: bool,
    out: Option<String>,
}

fn usage() -> &'static str {
    "mathgraph-cli\n\
\n\
USAGE:\n\
  mathgraph-cli [render] [OPTIONS] [<path>|-]\n\
  mathgraph-cli compare [OPTIONS] [--matches <json>] <a> <b>\n\
  mathgraph-cli summary [OPTIONS] [--matches <json>] [<path>|-] [<b>]\n\
\n\
OPTIONS:\n\
  --config <json>            render config file (exScalingFactor, minNodeSize, applyForm, headless, imageTemplate)\n\
  --apply-form               fold the first child of every eligible apply node into its parent\n\
  --headless                 skip layout and image requests\n\
  --image-template <tmpl>    node image path, `{id}` is replaced by the node's xref or id\n\
  --rankdir TB|BT|LR|RL      layout direction (default TB)\n\
  --nodesep <n>              horizontal gap between nodes\n\
  --ranksep <n>              vertical gap between ranks\n\
  --pretty                   pretty-print JSON\n\
  --out <path>               write JSON to a file instead of stdout\n\
  -v, --verbose              debug logging on stderr\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Without a drawing surface (--headless) no positions are computed.\n\
  - Images named by --image-template are read from the local filesystem to size nodes.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_number(raw: &str) -> Result<f64, CliError> {
    let v = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(v.is_finite() && v >= 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" if args.inputs.is_empty() => args.command = Command::Render,
            "compare" if args.inputs.is_empty() => args.command = Command::Compare,
            "summary" if args.inputs.is_empty() => args.command = Command::Summary,
            "--apply-form" => args.apply_form = true,
            "--headless" => args.headless = true,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--matches" => args.matches = Some(next_value(&mut it)?.clone()),
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--image-template" => args.image_template = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--rankdir" => {
                args.rankdir = next_value(&mut it)?
                    .parse::<RankDir>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--nodesep" => args.nodesep = Some(parse_number(next_value(&mut it)?)?),
            "--ranksep" => args.ranksep = Some(parse_number(next_value(&mut it)?)?),
            "--" => args.inputs.extend(it.by_ref().cloned()),
            "-" => args.inputs.push("-".to_string()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => args.inputs.push(path.to_string()),
        }
    }

    let max_inputs = match args.command {
        Command::Render => 1,
        Command::Compare | Command::Summary => 2,
    };
    if args.inputs.len() > max_inputs
        || (args.command == Command::Compare && args.inputs.len() != 2)
        || args.inputs.iter().filter(|i| *i == "-").count() > 1
    {
        return Err(CliError::Usage(usage()));
    }
    if args.matches.is_some() && args.inputs.len() < 2 {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn load_tree(input: Option<&str>) -> Result<ExprNode, CliError> {
    let xml = read_input(input)?;
    Ok(parse_mathml(&xml)?)
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    match out {
        None => print!("{text}"),
        Some(path) => std::fs::write(path, text)?,
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<RenderConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => RenderConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => RenderConfig::default(),
    };
    config.apply_form |= args.apply_form;
    config.headless |= args.headless;
    if let Some(template) = &args.image_template {
        config.image_template = Some(template.clone());
    }
    Ok(config)
}

fn build_capabilities(args: &Args) -> Capabilities {
    let defaults = LayoutOptions::default();
    let options = LayoutOptions {
        rankdir: args.rankdir,
        nodesep: args.nodesep.unwrap_or(defaults.nodesep),
        ranksep: args.ranksep.unwrap_or(defaults.ranksep),
        ..defaults
    };
    Capabilities::default().with_layout(LayeredLayout::new(options))
}

fn load_correspondences(path: Option<&str>) -> Result<Vec<Correspondence>, CliError> {
    match path {
        Some(path) => Ok(parse_correspondences(&std::fs::read_to_string(path)?)?),
        None => Ok(Vec::new()),
    }
}

/// Sizes nodes from image files on disk; symbol metadata needs a network and is not fetched.
fn resolve_local_images(session: &mut RenderSession) {
    block_on(session.resolve_pending(
        |req: &ImageRequest| {
            let svg = std::fs::read_to_string(&req.url);
            async move { svg }
        },
        |_: &SymbolLookup| async {
            Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "symbol lookups are not available offline",
            ))
        },
    ));
}

fn run(args: Args) -> Result<(), CliError> {
    let config = build_config(&args)?;
    let capabilities = build_capabilities(&args);

    let mut session = if args.inputs.len() == 2 {
        let a = load_tree(Some(&args.inputs[0]))?;
        let b = load_tree(Some(&args.inputs[1]))?;
        let correspondences = load_correspondences(args.matches.as_deref())?;
        mathgraph::render::compare(&a, &b, &correspondences, &config, &capabilities)?
    } else {
        let tree = load_tree(args.inputs.first().map(String::as_str))?;
        mathgraph::render::render_single_tree(&tree, &config, &capabilities)?
    };
    tracing::debug!(?session, "rendered");

    if !config.headless {
        resolve_local_images(&mut session);
    }

    match args.command {
        Command::Render | Command::Compare => {
            write_json(&session.output(), args.pretty, args.out.as_deref())
        }
        Command::Summary => {
            write_json(&session.graph().summary(), args.pretty, args.out.as_deref())
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
