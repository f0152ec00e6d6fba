use anyhow::Result;

use crate::config::{DEFAULT_JOIN_ATTR, DEFAULT_JOIN_SEPARATOR};
use crate::pipeline::Stage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    PrivateIp,
    PrivateIps,
    PublicIp,
    PublicIps,
    InterfaceIp {
        pattern: String,
        flags: Vec<String>,
    },
    InterfaceIps {
        pattern: String,
    },
    Interfaces,
    Dump {
        json: bool,
        addrs: Vec<String>,
    },
    Rfc {
        rfc: u32,
        addr: String,
    },
    RfcList,
    Filter {
        stages: Vec<Stage>,
        join_attr: String,
        separator: String,
    },
    Help,
    Version,
}

pub fn version_text() -> String {
    format!("nexus-ifaddr {}", env!("CARGO_PKG_VERSION"))
}

pub fn usage_text() -> String {
    format!(
        "{version}
NEXUS ifaddr - query, filter and sort local interface addresses

Usage:
  nexus-ifaddr private-ip
  nexus-ifaddr private-ips
  nexus-ifaddr public-ip
  nexus-ifaddr public-ips
  nexus-ifaddr interface-ip <REGEX> [--flag <FLAG>]...
  nexus-ifaddr interface-ips <REGEX>
  nexus-ifaddr interfaces
  nexus-ifaddr dump [--json] <ADDR>...
  nexus-ifaddr rfc <NUM> <ADDR>
  nexus-ifaddr rfc-list
  nexus-ifaddr filter [STAGE]...
  nexus-ifaddr --help
  nexus-ifaddr --version

Filter stages (applied in order):
      --include <SEL=VAL>  Keep matches; SEL is name, flag, rfc, type or network
      --exclude <SEL=VAL>  Drop matches
      --sort <SPEC>        Sort keys, e.g. +type,-address
      --unique <ATTR>      Keep the first entry per attribute value
      --limit <N>          Keep the first N entries
      --offset <N>         Skip N entries; negative keeps the last |N|
      --reverse            Reverse the order
      --math <OP=DELTA>    Shift the address or network, e.g. network=+1

Filter output:
      --join <ATTR>        Attribute to print (default: {join_attr})
      --sep <S>            Separator between results (default: {separator:?})

Options:
      --flag <FLAG>        interface-ip: required flag (default: forwardable)
      --json               dump: print JSON instead of a table
  -h, --help               Show this help text
  -V, --version            Show version

Environment:
  NEXUS_IFADDR_SORT        Sort used by the address queries
  NEXUS_IFADDR_SEPARATOR   Separator used by the plural queries
  NEXUS_IFADDR_LOG_FILE    Also write JSON logs to the config directory
  RUST_LOG                 Log filter (default: warn)",
        version = version_text(),
        join_attr = DEFAULT_JOIN_ATTR,
        separator = DEFAULT_JOIN_SEPARATOR,
    )
}

fn missing_value(flag: &str) -> anyhow::Error {
    anyhow::anyhow!("Missing value for {}.\n\n{}", flag, usage_text())
}

fn parse_i64_arg(flag: &str, raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| {
        anyhow::anyhow!(
            "Invalid value for {}: '{}'. Expected an integer.\n\n{}",
            flag,
            raw,
            usage_text()
        )
    })
}

fn split_pair(flag: &str, raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(anyhow::anyhow!(
            "Invalid value for {}: '{}'. Expected KEY=VALUE.\n\n{}",
            flag,
            raw,
            usage_text()
        )),
    }
}

fn is_help(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn no_arguments(command: CliCommand, rest: &[String]) -> Result<CliCommand> {
    match rest.first() {
        None => Ok(command),
        Some(arg) if is_help(arg) => Ok(CliCommand::Help),
        Some(arg) => Err(anyhow::anyhow!(
            "Unexpected argument: {arg}\n\n{}",
            usage_text()
        )),
    }
}

fn parse_interface_ip(rest: &[String]) -> Result<CliCommand> {
    let mut pattern: Option<String> = None;
    let mut flags = Vec::new();
    let mut iter = rest.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "--flag" => {
                let value = iter.next().ok_or_else(|| missing_value("--flag"))?;
                flags.push(value.clone());
            }
            _ if arg.starts_with("--flag=") => {
                let value = arg.split_once('=').map(|(_, v)| v).unwrap_or_default();
                if value.is_empty() {
                    return Err(missing_value("--flag"));
                }
                flags.push(value.to_string());
            }
            _ if pattern.is_none() => pattern = Some(arg.clone()),
            _ => {
                return Err(anyhow::anyhow!(
                    "Unexpected argument: {arg}\n\n{}",
                    usage_text()
                ));
            }
        }
    }

    let pattern = pattern.ok_or_else(|| {
        anyhow::anyhow!("interface-ip requires an interface name pattern.\n\n{}", usage_text())
    })?;
    Ok(CliCommand::InterfaceIp { pattern, flags })
}

fn parse_interface_ips(rest: &[String]) -> Result<CliCommand> {
    match rest {
        [arg] if is_help(arg) => Ok(CliCommand::Help),
        [pattern] => Ok(CliCommand::InterfaceIps {
            pattern: pattern.clone(),
        }),
        [] => Err(anyhow::anyhow!(
            "interface-ips requires an interface name pattern.\n\n{}",
            usage_text()
        )),
        [_, extra, ..] => Err(anyhow::anyhow!(
            "Unexpected argument: {extra}\n\n{}",
            usage_text()
        )),
    }
}

fn parse_dump(rest: &[String]) -> Result<CliCommand> {
    let mut json = false;
    let mut addrs = Vec::new();

    for arg in rest {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "--json" => json = true,
            _ => addrs.push(arg.clone()),
        }
    }

    if addrs.is_empty() {
        return Err(anyhow::anyhow!(
            "dump requires at least one address.\n\n{}",
            usage_text()
        ));
    }
    Ok(CliCommand::Dump { json, addrs })
}

fn parse_rfc_command(rest: &[String]) -> Result<CliCommand> {
    match rest {
        [arg] if is_help(arg) => Ok(CliCommand::Help),
        [rfc, addr] => {
            let rfc = rfc.parse::<u32>().map_err(|_| {
                anyhow::anyhow!(
                    "Invalid RFC number: '{}'. Expected a positive integer.\n\n{}",
                    rfc,
                    usage_text()
                )
            })?;
            Ok(CliCommand::Rfc {
                rfc,
                addr: addr.clone(),
            })
        }
        _ => Err(anyhow::anyhow!(
            "rfc requires an RFC number and an address.\n\n{}",
            usage_text()
        )),
    }
}

fn parse_filter(rest: &[String]) -> Result<CliCommand> {
    let mut stages = Vec::new();
    let mut join_attr = DEFAULT_JOIN_ATTR.to_string();
    let mut separator = DEFAULT_JOIN_SEPARATOR.to_string();
    let mut iter = rest.iter();

    while let Some(arg) = iter.next() {
        let flag = arg.as_str();
        if is_help(flag) {
            return Ok(CliCommand::Help);
        }
        if flag == "--reverse" {
            stages.push(Stage::Reverse);
            continue;
        }

        let value = match flag {
            "--include" | "--exclude" | "--sort" | "--unique" | "--limit" | "--offset"
            | "--math" | "--join" | "--sep" => {
                iter.next().ok_or_else(|| missing_value(flag))?.as_str()
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "Unknown filter argument: {arg}\n\n{}",
                    usage_text()
                ));
            }
        };

        match flag {
            "--include" => {
                let (selector, param) = split_pair(flag, value)?;
                stages.push(Stage::Include { selector, param });
            }
            "--exclude" => {
                let (selector, param) = split_pair(flag, value)?;
                stages.push(Stage::Exclude { selector, param });
            }
            "--sort" => stages.push(Stage::Sort(value.to_string())),
            "--unique" => stages.push(Stage::Unique(value.to_string())),
            "--limit" => stages.push(Stage::Limit(parse_i64_arg(flag, value)?)),
            "--offset" => stages.push(Stage::Offset(parse_i64_arg(flag, value)?)),
            "--math" => {
                let (op, value) = split_pair(flag, value)?;
                stages.push(Stage::Math { op, value });
            }
            "--join" => join_attr = value.to_string(),
            _ => separator = value.to_string(),
        }
    }

    Ok(CliCommand::Filter {
        stages,
        join_attr,
        separator,
    })
}

pub fn parse_cli_args<I, S>(args: I) -> Result<CliCommand>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut iter = args.into_iter();
    let _program_name = iter.next();
    let args: Vec<String> = iter.map(|arg| arg.as_ref().to_string()).collect();

    let Some((command, rest)) = args.split_first() else {
        return Ok(CliCommand::Help);
    };

    match command.as_str() {
        "-h" | "--help" => Ok(CliCommand::Help),
        "-V" | "--version" => Ok(CliCommand::Version),
        "private-ip" => no_arguments(CliCommand::PrivateIp, rest),
        "private-ips" => no_arguments(CliCommand::PrivateIps, rest),
        "public-ip" => no_arguments(CliCommand::PublicIp, rest),
        "public-ips" => no_arguments(CliCommand::PublicIps, rest),
        "interface-ip" => parse_interface_ip(rest),
        "interface-ips" => parse_interface_ips(rest),
        "interfaces" => no_arguments(CliCommand::Interfaces, rest),
        "dump" => parse_dump(rest),
        "rfc" => parse_rfc_command(rest),
        "rfc-list" => no_arguments(CliCommand::RfcList, rest),
        "filter" => parse_filter(rest),
        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\n\n{}",
            usage_text()
        )),
    }
}
