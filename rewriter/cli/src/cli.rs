use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use alloy_primitives::Address;
use anyhow::{Context, Result, bail};
use clap::{Arg, ArgMatches, Command};
use serde::Serialize;
use smartpool_calldata::{
    CalldataRewriter, LogTracer, RecipientEvent, RewriterConfig, inspect_with_config,
};

use crate::logging::{self, LogFormat};

#[derive(Debug, Serialize)]
struct RewriteReport {
    calldata: String,
    modified: bool,
    events: Vec<RecipientEvent>,
}

/// Decodes hex calldata, with or without `0x`. `-` reads it from stdin.
fn read_calldata(value: &str) -> Result<Vec<u8>> {
    let raw = if value == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read calldata from stdin")?;
        buf
    } else {
        value.to_string()
    };
    let trimmed = raw.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed)).context("calldata is not valid hex")
}

fn load_config(path: Option<&String>) -> Result<RewriterConfig> {
    let Some(path) = path else {
        return Ok(RewriterConfig::default());
    };
    let json =
        fs::read_to_string(path).with_context(|| format!("failed to read config file {path}"))?;
    RewriterConfig::from_json(&json).with_context(|| format!("invalid config file {path}"))
}

fn run_rewrite(matches: &ArgMatches) -> Result<String> {
    let calldata = read_calldata(required(matches, "calldata")?)?;
    let target_arg = required(matches, "target")?;
    let target: Address = target_arg
        .parse()
        .with_context(|| format!("invalid target address {target_arg}"))?;
    let config = load_config(matches.get_one::<String>("config"))?;

    tracing::info!(%target, bytes = calldata.len(), ?config, "rewriting calldata");

    let mut tracer = (LogTracer, Vec::<RecipientEvent>::new());
    let rewritten = CalldataRewriter::with_config(target, config)
        .rewrite_traced(&calldata, &mut tracer)
        .context("calldata rewrite failed")?;
    let modified = rewritten.as_ref() != calldata.as_slice();
    let events = tracer.1;

    tracing::info!(
        modified,
        redirected = events.iter().filter(|e| e.decision.is_redirect()).count(),
        "rewrite complete"
    );

    let hex_out = format!("0x{}", hex::encode(&rewritten));
    match output_format(matches) {
        "json" => {
            let report = RewriteReport {
                calldata: hex_out,
                modified,
                events,
            };
            serde_json::to_string_pretty(&report).context("failed to serialize report")
        }
        _ => Ok(hex_out),
    }
}

fn run_inspect(matches: &ArgMatches) -> Result<String> {
    let calldata = read_calldata(required(matches, "calldata")?)?;
    let config = load_config(matches.get_one::<String>("config"))?;

    let summary = inspect_with_config(&calldata, &config).context("calldata inspection failed")?;
    tracing::debug!(commands = summary.commands.len(), "inspected calldata");

    match output_format(matches) {
        "json" => serde_json::to_string_pretty(&summary).context("failed to serialize summary"),
        _ => Ok(summary.to_string().trim_end().to_string()),
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(id)
        .with_context(|| format!("missing --{id}"))
}

fn output_format(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or("text")
}

fn calldata_arg() -> Arg {
    Arg::new("calldata")
        .short('t')
        .long("calldata")
        .value_name("HEX")
        .help("Universal Router execute calldata as hex, or - to read stdin")
        .required(true)
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FORMAT")
        .help("Output format")
        .value_parser(["text", "json"])
        .default_value("text")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("JSON rewriter configuration")
}

/// smart pool calldata cli
pub struct Cli;

impl Cli {
    fn command() -> Command {
        Command::new("smartpool-rewrite")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Redirects Universal Router settlement outputs to a smart pool")
            .subcommand_required(true)
            .arg(
                Arg::new("log-format")
                    .long("log-format")
                    .value_name("FORMAT")
                    .help("Log output format (logs go to stderr)")
                    .value_parser(["pretty", "bunyan"])
                    .default_value("pretty")
                    .global(true),
            )
            .subcommand(
                Command::new("rewrite")
                    .about("Rewrite settlement recipients to the target address")
                    .arg(calldata_arg())
                    .arg(
                        Arg::new("target")
                            .short('r')
                            .long("target")
                            .value_name("ADDRESS")
                            .help("Smart pool address receiving the outputs")
                            .required(true),
                    )
                    .arg(config_arg())
                    .arg(output_arg()),
            )
            .subcommand(
                Command::new("inspect")
                    .about("List the commands, actions and recipients of a payload")
                    .arg(calldata_arg())
                    .arg(config_arg())
                    .arg(output_arg()),
            )
    }

    fn run(matches: &ArgMatches) -> Result<String> {
        match matches.subcommand() {
            Some(("rewrite", sub)) => run_rewrite(sub),
            Some(("inspect", sub)) => run_inspect(sub),
            Some((other, _)) => bail!("unknown subcommand {other}"),
            None => bail!("a subcommand is required"),
        }
    }

    /// Parses the command line, runs the subcommand and prints its result
    /// to stdout. Errors are printed to stderr with a failing exit code.
    pub fn execute() -> ExitCode {
        let matches = Self::command().get_matches();

        let log_format = matches
            .get_one::<String>("log-format")
            .map(|s| LogFormat::from_arg(s))
            .unwrap_or(LogFormat::Pretty);
        if let Err(err) = logging::init(log_format) {
            eprintln!("Warning: failed to initialise logging: {err:#}");
        }

        match Self::run(&matches) {
            Ok(output) => {
                println!("{output}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "command failed");
                eprintln!("Error: {err:#}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, U256, address};
    use alloy_sol_types::{SolCall, SolValue};
    use pretty_assertions::assert_eq;
    use smartpool_calldata::commands::{IUniversalRouter, SweepParams};

    const POOL: Address = address!("0x00000000000000000000000000000000000b0b01");
    const USER: Address = address!("0x1111111111111111111111111111111111111111");
    const WETH: Address = address!("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

    fn sweep_call(recipient: Address) -> Vec<u8> {
        let sweep = SweepParams {
            token: WETH,
            recipient,
            amountMinimum: U256::from(1000),
        };
        IUniversalRouter::execute_0Call {
            commands: Bytes::from(vec![0x04]),
            inputs: vec![sweep.abi_encode().into()],
            deadline: U256::from(1_700_000_000u64),
        }
        .abi_encode()
    }

    fn run_args(args: &[&str]) -> Result<String> {
        let matches = Cli::command().try_get_matches_from(args)?;
        Cli::run(&matches)
    }

    #[test]
    fn test_read_calldata_prefix_optional() {
        assert_eq!(read_calldata("0x0a0b").unwrap(), vec![0x0a, 0x0b]);
        assert_eq!(read_calldata(" 0a0b\n").unwrap(), vec![0x0a, 0x0b]);
        assert!(read_calldata("0xzz").is_err());
    }

    #[test]
    fn test_rewrite_text_output() {
        let input = format!("0x{}", hex::encode(sweep_call(USER)));
        let target = POOL.to_string();

        let out = run_args(&["smartpool-rewrite", "rewrite", "-t", &input, "-r", &target]).unwrap();

        assert_eq!(out, format!("0x{}", hex::encode(sweep_call(POOL))));
    }

    #[test]
    fn test_rewrite_json_report() {
        let input = hex::encode(sweep_call(USER));
        let target = POOL.to_string();

        let out = run_args(&[
            "smartpool-rewrite",
            "rewrite",
            "--calldata",
            &input,
            "--target",
            &target,
            "--output",
            "json",
        ])
        .unwrap();

        let report: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(report["modified"], true);
        assert_eq!(report["events"].as_array().unwrap().len(), 1);
        assert_eq!(report["events"][0]["decision"]["kind"], "redirect");
        assert_eq!(
            report["calldata"],
            format!("0x{}", hex::encode(sweep_call(POOL)))
        );
    }

    #[test]
    fn test_rewrite_unchanged_is_not_modified() {
        let input = hex::encode(sweep_call(POOL));
        let target = POOL.to_string();

        let out = run_args(&[
            "smartpool-rewrite",
            "rewrite",
            "-t",
            &input,
            "-r",
            &target,
            "-o",
            "json",
        ])
        .unwrap();

        let report: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(report["modified"], false);
        assert_eq!(report["calldata"], format!("0x{input}"));
    }

    #[test]
    fn test_rewrite_rejects_bad_target() {
        let input = hex::encode(sweep_call(USER));
        let err = run_args(&["smartpool-rewrite", "rewrite", "-t", &input, "-r", "0x1234"])
            .unwrap_err();
        assert!(format!("{err:#}").contains("invalid target address"));
    }

    #[test]
    fn test_rewrite_rejects_non_execute_calldata() {
        let target = POOL.to_string();
        let err = run_args(&["smartpool-rewrite", "rewrite", "-t", "0xdeadbeef", "-r", &target])
            .unwrap_err();
        assert!(format!("{err:#}").contains("calldata rewrite failed"));
    }

    #[test]
    fn test_missing_config_file() {
        let input = hex::encode(sweep_call(USER));
        let target = POOL.to_string();
        let err = run_args(&[
            "smartpool-rewrite",
            "rewrite",
            "-t",
            &input,
            "-r",
            &target,
            "-c",
            "/nonexistent/rewriter.json",
        ])
        .unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }

    #[test]
    fn test_inspect_text_output() {
        let input = hex::encode(sweep_call(USER));

        let out = run_args(&["smartpool-rewrite", "inspect", "-t", &input]).unwrap();

        assert_eq!(
            out,
            format!("deadline: 1700000000\n[0] 0x04 Sweep (96 bytes) recipient={USER}")
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::command().try_get_matches_from(["smartpool-rewrite"]).is_err());
    }
}
