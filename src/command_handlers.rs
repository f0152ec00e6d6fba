use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::attr::AddrReport;
use crate::config::FORWARDABLE_FLAG;
use crate::pipeline::{self, Stage};
use crate::query;
use crate::rfc;
use crate::sockaddr::SockAddr;

/// Which convenience query to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddrQuery {
    PrivateIp,
    PrivateIps,
    PublicIp,
    PublicIps,
}

pub(crate) fn answer_query(kind: AddrQuery, context: &AppContext) -> Result<String> {
    let seq = context
        .interfaces()
        .context("Failed to enumerate interface addresses")?;
    let options = context.options();
    let answer = match kind {
        AddrQuery::PrivateIp => query::private_ip(&seq, options),
        AddrQuery::PrivateIps => query::private_ips(&seq, options),
        AddrQuery::PublicIp => query::public_ip(&seq, options),
        AddrQuery::PublicIps => query::public_ips(&seq, options),
    };
    answer.with_context(|| format!("Failed to answer {:?}", kind))
}

pub(crate) fn interface_ip(
    pattern: &str,
    flags: &[String],
    context: &AppContext,
) -> Result<String> {
    let seq = context
        .interfaces()
        .context("Failed to enumerate interface addresses")?;
    let flags: Vec<&str> = if flags.is_empty() {
        vec![FORWARDABLE_FLAG]
    } else {
        flags.iter().map(String::as_str).collect()
    };
    query::interface_ip_with_flags(&seq, pattern, &flags, context.options())
        .with_context(|| format!("Failed to query interface '{}'", pattern))
}

pub(crate) fn interface_ips(pattern: &str, context: &AppContext) -> Result<String> {
    let seq = context
        .interfaces()
        .context("Failed to enumerate interface addresses")?;
    query::interface_ips(&seq, pattern, context.options())
        .with_context(|| format!("Failed to query interface '{}'", pattern))
}

pub(crate) fn collect_interfaces(context: &AppContext) -> Result<Vec<String>> {
    let seq = context
        .interfaces()
        .context("Failed to enumerate interface addresses")?;
    Ok(seq.iter().map(ToString::to_string).collect())
}

pub(crate) fn dump_reports(addrs: &[String]) -> Result<Vec<AddrReport>> {
    addrs
        .iter()
        .map(|input| {
            let addr = SockAddr::parse(input)
                .with_context(|| format!("Failed to parse address '{}'", input))?;
            Ok(AddrReport::new(input, &addr))
        })
        .collect()
}

pub(crate) fn rfc_membership(rfc: u32, addr: &str) -> Result<bool> {
    let parsed =
        SockAddr::parse(addr).with_context(|| format!("Failed to parse address '{}'", addr))?;
    rfc::matches_rfc(&parsed, rfc).with_context(|| format!("Failed to check RFC {}", rfc))
}

pub(crate) fn run_filter(
    stages: &[Stage],
    join_attr: &str,
    separator: &str,
    context: &AppContext,
) -> Result<String> {
    let seq = context
        .interfaces()
        .context("Failed to enumerate interface addresses")?;
    let filtered = pipeline::run(&seq, stages).context("Filter pipeline failed")?;
    pipeline::join(&filtered, join_attr, separator)
        .with_context(|| format!("Failed to render attribute '{}'", join_attr))
}
