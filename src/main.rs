// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::env;

use clap::Parser;

use npk_inference::cli::args::{Cli, describe_parse_error, is_informational, split_measurements};
use npk_inference::cli::logging::set_verbose;
use npk_inference::cli::predict::run;
use npk_inference::{PredictError, Response};

fn main() {
    let argv = split_measurements(env::args_os().map(|a| a.to_string_lossy().into_owned()));

    let response = match Cli::try_parse_from(argv) {
        Ok(cli) => {
            set_verbose(cli.verbose);
            run(&cli)
        }
        Err(err) if is_informational(&err) => err.exit(),
        Err(err) => Response::from_error(&PredictError::InvalidCli(describe_parse_error(&err))),
    };

    println!("{}", response.to_json_line());
}
