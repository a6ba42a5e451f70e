// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Command, CommandFactory, Parser};

use crate::device::Device;
use crate::model::DEFAULT_MODEL;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"Output:
    One line of JSON on stdout, either
    {"predicted_nitrogen": N, "predicted_phosphorus": P|null, "predicted_potassium": K|null}
    or {"error": "<message>"}.

Examples:
    npk-inference 24.5 70.3 6.5 200
    npk-inference --model models/npk.onnx -- -2.5 80 5.8 120
    NPK_MODEL=/srv/npk.onnx npk-inference 30 65 7.1 95 --verbose"#)]
pub struct Cli {
    /// Field measurements: temperature humidity ph rainfall
    #[arg(
        value_name = "MEASUREMENTS",
        num_args = 0..,
        allow_negative_numbers = true
    )]
    pub values: Vec<String>,

    /// Path to ONNX model file
    #[arg(short, long, env = "NPK_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Device to use (cpu, cuda:0, coreml, directml:0, openvino)
    #[arg(long, env = "NPK_DEVICE")]
    pub device: Option<Device>,

    /// Number of intra-op threads (0 = let ONNX Runtime decide)
    #[arg(long, env = "NPK_THREADS", default_value_t = 0)]
    pub threads: usize,

    /// Print diagnostics to stderr
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

/// Reorder raw argv so every measurement lands after a `--` separator.
///
/// Known options keep their place (with their value, if they take one), and
/// unknown `--long` options are left for clap to reject. Every other token is
/// a measurement, including hyphen-led ones clap would read as short flags,
/// such as `-.5`, `-inf` or `-abc`.
pub fn split_measurements<I, T>(argv: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut cmd = Cli::command();
    cmd.build();

    let mut argv = argv.into_iter().map(Into::into);
    let mut options: Vec<String> = argv.next().into_iter().collect();
    let mut values = Vec::new();

    while let Some(token) = argv.next() {
        if token == "--" {
            values.extend(argv.by_ref());
            break;
        }
        match option_arity(&cmd, &token) {
            Some(needs_value) => {
                options.push(token);
                if needs_value {
                    options.extend(argv.next());
                }
            }
            None => values.push(token),
        }
    }

    if !values.is_empty() {
        options.push("--".to_string());
        options.extend(values);
    }
    options
}

/// `Some(needs_value)` if `token` is an option for clap, `None` for a measurement.
fn option_arity(cmd: &Command, token: &str) -> Option<bool> {
    if let Some(long) = token.strip_prefix("--") {
        let (name, inline) = long.split_once('=').map_or((long, false), |(n, _)| (n, true));
        let takes_value = cmd
            .get_arguments()
            .find(|a| a.get_long() == Some(name))
            .is_some_and(|a| a.get_action().takes_values());
        return Some(takes_value && !inline);
    }

    let mut chars = token.strip_prefix('-')?.chars();
    let short = chars.next()?;
    let arg = cmd.get_arguments().find(|a| a.get_short() == Some(short))?;
    Some(arg.get_action().takes_values() && chars.as_str().is_empty())
}

/// Whether a parse error is really a request for help or version output.
#[must_use]
pub fn is_informational(err: &clap::Error) -> bool {
    use clap::error::ErrorKind;
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

/// One-line description of a parse error for the JSON payload.
#[must_use]
pub fn describe_parse_error(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let line = rendered.lines().next().unwrap_or_default().trim();
    line.strip_prefix("error:").unwrap_or(line).trim().to_string()
}
