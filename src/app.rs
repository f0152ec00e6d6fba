use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use crate::attr::AddrReport;
use crate::cli::{parse_cli_args, usage_text, version_text, CliCommand};
use crate::command_handlers::{
    answer_query, collect_interfaces, dump_reports, interface_ip, interface_ips, rfc_membership,
    run_filter, AddrQuery,
};
use crate::models::IfAddr;
use crate::network::{InterfaceProvider, OsInterfaceProvider};
use crate::query::QueryOptions;
use crate::rfc::known_rfcs;

pub type OutputHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Where addresses come from and where answers go
#[derive(Clone)]
pub struct AppContext {
    provider: Arc<dyn InterfaceProvider + Send + Sync>,
    options: QueryOptions,
    output_hook: OutputHook,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum AppCommandResult {
    HelpText(String),
    VersionText(String),
    Answer(String),
    Interfaces(Vec<String>),
    Dump { json: bool, reports: Vec<AddrReport> },
    RfcMatch(bool),
    RfcList(Vec<u32>),
}

impl Default for AppContext {
    fn default() -> Self {
        Self::from_env()
    }
}

impl AppContext {
    pub fn from_env() -> Self {
        Self {
            provider: Arc::new(OsInterfaceProvider),
            options: QueryOptions::from_env(),
            output_hook: Arc::new(|line| println!("{}", line)),
        }
    }

    pub fn with_provider<P>(mut self, provider: P) -> Self
    where
        P: InterfaceProvider + Send + Sync + 'static,
    {
        self.provider = Arc::new(provider);
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_output_hook(mut self, output_hook: OutputHook) -> Self {
        self.output_hook = output_hook;
        self
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn interfaces(&self) -> crate::Result<Vec<IfAddr>> {
        self.provider.interfaces()
    }

    pub fn emit_line(&self, line: &str) {
        (self.output_hook)(line);
    }
}

/// Run the app by parsing CLI-style args and dispatching the command.
pub fn run<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let context = AppContext::from_env();
    run_with_context(args, &context)
}

pub fn run_with_context<I, S>(args: I, context: &AppContext) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let command = parse_cli_args(args)?;
    execute_command_with_context(command, context)
}

/// Execute a pre-parsed command. This is reusable for non-CLI entrypoints.
pub fn execute_command(command: CliCommand) -> Result<()> {
    let context = AppContext::from_env();
    execute_command_with_context(command, &context)
}

/// Execute a pre-parsed command with an explicit execution context.
pub fn execute_command_with_context(command: CliCommand, context: &AppContext) -> Result<()> {
    tracing::debug!(?command, "executing command");
    let result = execute_command_typed(command, context)?;
    emit_command_result(&result, context)
}

/// Execute a pre-parsed command and return a strongly-typed result payload.
pub fn execute_command_typed(command: CliCommand, context: &AppContext) -> Result<AppCommandResult> {
    match command {
        CliCommand::Help => Ok(AppCommandResult::HelpText(usage_text())),
        CliCommand::Version => Ok(AppCommandResult::VersionText(version_text())),
        CliCommand::PrivateIp => Ok(AppCommandResult::Answer(answer_query(
            AddrQuery::PrivateIp,
            context,
        )?)),
        CliCommand::PrivateIps => Ok(AppCommandResult::Answer(answer_query(
            AddrQuery::PrivateIps,
            context,
        )?)),
        CliCommand::PublicIp => Ok(AppCommandResult::Answer(answer_query(
            AddrQuery::PublicIp,
            context,
        )?)),
        CliCommand::PublicIps => Ok(AppCommandResult::Answer(answer_query(
            AddrQuery::PublicIps,
            context,
        )?)),
        CliCommand::InterfaceIp { pattern, flags } => Ok(AppCommandResult::Answer(
            interface_ip(&pattern, &flags, context)?,
        )),
        CliCommand::InterfaceIps { pattern } => {
            Ok(AppCommandResult::Answer(interface_ips(&pattern, context)?))
        }
        CliCommand::Interfaces => Ok(AppCommandResult::Interfaces(collect_interfaces(context)?)),
        CliCommand::Dump { json, addrs } => Ok(AppCommandResult::Dump {
            json,
            reports: dump_reports(&addrs)?,
        }),
        CliCommand::Rfc { rfc, addr } => Ok(AppCommandResult::RfcMatch(rfc_membership(rfc, &addr)?)),
        CliCommand::RfcList => Ok(AppCommandResult::RfcList(known_rfcs())),
        CliCommand::Filter {
            stages,
            join_attr,
            separator,
        } => Ok(AppCommandResult::Answer(run_filter(
            &stages, &join_attr, &separator, context,
        )?)),
    }
}

fn emit_command_result(result: &AppCommandResult, context: &AppContext) -> Result<()> {
    match result {
        AppCommandResult::HelpText(text)
        | AppCommandResult::VersionText(text)
        | AppCommandResult::Answer(text) => {
            context.emit_line(text);
            Ok(())
        }
        AppCommandResult::Interfaces(interfaces) => {
            if interfaces.is_empty() {
                context.emit_line("No interface addresses found.");
            } else {
                for interface in interfaces {
                    context.emit_line(interface);
                }
            }
            Ok(())
        }
        AppCommandResult::Dump { json: true, reports } => {
            let output = serde_json::to_string_pretty(reports)
                .context("Failed to serialize address dump")?;
            context.emit_line(&output);
            Ok(())
        }
        AppCommandResult::Dump {
            json: false,
            reports,
        } => {
            for report in reports {
                context.emit_line(&format!("Address: {} ({})", report.input, report.addr_type));
                context.emit_line(report.to_string().trim_end());
            }
            Ok(())
        }
        AppCommandResult::RfcMatch(matched) => {
            context.emit_line(if *matched { "true" } else { "false" });
            Ok(())
        }
        AppCommandResult::RfcList(rfcs) => {
            for rfc in rfcs {
                context.emit_line(&rfc.to_string());
            }
            Ok(())
        }
    }
}
