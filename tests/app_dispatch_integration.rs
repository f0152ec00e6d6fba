use std::sync::{Arc, Mutex};

use nexus_ifaddr::{
    execute_command_with_context, run_with_context, AppContext, CliCommand, IfFlags, Interface,
    OutputHook, QueryOptions, Stage, StaticInterfaceProvider,
};

fn host_provider() -> StaticInterfaceProvider {
    let lo = Interface::new(
        1,
        65536,
        "lo",
        IfFlags::UP | IfFlags::LOOPBACK | IfFlags::RUNNING,
    );
    let eth0 = Interface::new(
        2,
        1500,
        "eth0",
        IfFlags::UP | IfFlags::BROADCAST | IfFlags::MULTICAST | IfFlags::RUNNING,
    );
    let wlan0 = Interface::new(
        3,
        1500,
        "wlan0",
        IfFlags::UP | IfFlags::BROADCAST | IfFlags::MULTICAST,
    );

    StaticInterfaceProvider::from_entries([
        ("127.0.0.1/8", lo.clone()),
        ("::1", lo),
        ("192.168.1.20/24", eth0.clone()),
        ("93.184.216.34/24", eth0.clone()),
        ("fe80::1/64", eth0.clone()),
        ("2606:4700::1111/64", eth0),
        ("10.0.0.5/16", wlan0),
    ])
    .expect("host table should parse")
}

fn make_test_context() -> (AppContext, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let output_hook: OutputHook = Arc::new(move |line| {
        sink.lock()
            .expect("output lock should not be poisoned")
            .push(line.to_string());
    });

    let context = AppContext::from_env()
        .with_provider(host_provider())
        .with_options(QueryOptions::default())
        .with_output_hook(output_hook);

    (context, lines)
}

fn output_of(command: CliCommand) -> String {
    let (context, lines) = make_test_context();
    execute_command_with_context(command, &context).expect("command should succeed");
    let output = lines
        .lock()
        .expect("output lock should not be poisoned")
        .join("\n");
    output
}

fn output_of_args(args: &[&str]) -> String {
    let (context, lines) = make_test_context();
    let argv = std::iter::once("nexus-ifaddr").chain(args.iter().copied());
    run_with_context(argv, &context).expect("args should run");
    let output = lines
        .lock()
        .expect("output lock should not be poisoned")
        .join("\n");
    output
}

#[test]
fn help_command_writes_usage_to_output_hook() {
    let output = output_of(CliCommand::Help);
    assert!(output.contains("Usage:"));
    assert!(output.contains("nexus-ifaddr interface-ip <REGEX>"));
}

#[test]
fn private_queries_prefer_broad_ipv4_networks() {
    assert_eq!(output_of(CliCommand::PrivateIp), "10.0.0.5");
    assert_eq!(output_of(CliCommand::PrivateIps), "10.0.0.5 192.168.1.20");
}

#[test]
fn public_queries_skip_special_purpose_blocks() {
    assert_eq!(output_of(CliCommand::PublicIp), "93.184.216.34");
    assert_eq!(
        output_of(CliCommand::PublicIps),
        "93.184.216.34 2606:4700::1111"
    );
}

#[test]
fn interface_ip_defaults_to_forwardable_addresses() {
    let output = output_of(CliCommand::InterfaceIp {
        pattern: "^eth0$".to_string(),
        flags: Vec::new(),
    });
    assert_eq!(output, "192.168.1.20");

    let output = output_of(CliCommand::InterfaceIp {
        pattern: "^eth0$".to_string(),
        flags: vec!["link-local unicast".to_string()],
    });
    assert_eq!(output, "fe80::1");

    let output = output_of(CliCommand::InterfaceIp {
        pattern: "^lo$".to_string(),
        flags: Vec::new(),
    });
    assert_eq!(output, "");
}

#[test]
fn interface_ips_lists_every_address_on_match() {
    let output = output_of(CliCommand::InterfaceIps {
        pattern: "^eth0$".to_string(),
    });
    assert_eq!(output, "192.168.1.20 93.184.216.34 fe80::1 2606:4700::1111");

    let output = output_of(CliCommand::InterfaceIps {
        pattern: "^lo$".to_string(),
    });
    assert_eq!(output, "127.0.0.1 ::1");
}

#[test]
fn interfaces_command_prints_one_line_per_address() {
    let output = output_of(CliCommand::Interfaces);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[0].starts_with("127.0.0.1/8 {1 65536 lo"));
    assert!(lines[6].starts_with("10.0.0.5/16 {3 1500 wlan0"));
}

#[test]
fn filter_command_applies_stages_in_order() {
    let output = output_of(CliCommand::Filter {
        stages: vec![
            Stage::Include {
                selector: "type".to_string(),
                param: "IPv4".to_string(),
            },
            Stage::Exclude {
                selector: "name".to_string(),
                param: "^lo".to_string(),
            },
            Stage::Sort("+address".to_string()),
        ],
        join_attr: "address".to_string(),
        separator: ",".to_string(),
    });
    assert_eq!(output, "10.0.0.5,93.184.216.34,192.168.1.20");
}

#[test]
fn filter_args_render_interface_names() {
    let output = output_of_args(&[
        "filter",
        "--include",
        "rfc=1918",
        "--sort",
        "-address",
        "--join",
        "name",
    ]);
    assert_eq!(output, "eth0 wlan0");
}

#[test]
fn filter_reports_bad_stage_input() {
    let (context, _) = make_test_context();
    let err = execute_command_with_context(
        CliCommand::Filter {
            stages: vec![Stage::Limit(-1)],
            join_attr: "address".to_string(),
            separator: " ".to_string(),
        },
        &context,
    )
    .expect_err("negative limit should fail");
    assert!(format!("{:#}", err).contains("Filter pipeline failed"));
}

#[test]
fn rfc_command_prints_membership() {
    assert_eq!(
        output_of(CliCommand::Rfc {
            rfc: 4193,
            addr: "fd00::1".to_string(),
        }),
        "true"
    );
    assert_eq!(
        output_of(CliCommand::Rfc {
            rfc: 1918,
            addr: "93.184.216.34".to_string(),
        }),
        "false"
    );
}

#[test]
fn rfc_command_rejects_unknown_rfc() {
    let (context, _) = make_test_context();
    let err = execute_command_with_context(
        CliCommand::Rfc {
            rfc: 1,
            addr: "10.0.0.1".to_string(),
        },
        &context,
    )
    .expect_err("unknown rfc should fail");
    assert!(format!("{:#}", err).contains("Unknown RFC"));
}

#[test]
fn rfc_list_contains_registered_numbers() {
    let output = output_of(CliCommand::RfcList);
    let rfcs: Vec<&str> = output.lines().collect();
    assert!(rfcs.contains(&"1918"));
    assert!(rfcs.contains(&"6890"));
    assert_eq!(rfcs.first(), Some(&"919"));
}

#[test]
fn dump_json_outputs_attribute_map() {
    let output = output_of(CliCommand::Dump {
        json: true,
        addrs: vec!["10.0.0.1/8".to_string(), "/tmp/nexus.sock".to_string()],
    });
    let parsed: serde_json::Value =
        serde_json::from_str(&output).expect("dump output should be valid JSON");

    assert_eq!(parsed[0]["type"], "IPv4");
    assert_eq!(parsed[0]["attributes"]["network"], "10.0.0.0");
    assert_eq!(parsed[0]["attributes"]["broadcast"], "10.255.255.255");
    assert_eq!(parsed[0]["attributes"]["mask_bits"], "8");
    assert!(parsed[0]["attributes"].get("path").is_none());

    assert_eq!(parsed[1]["type"], "UNIX");
    assert_eq!(parsed[1]["attributes"]["path"], "/tmp/nexus.sock");
}

#[test]
fn dump_table_lists_attributes() {
    let output = output_of(CliCommand::Dump {
        json: false,
        addrs: vec!["192.168.0.102/24".to_string()],
    });
    assert!(output.starts_with("Address: 192.168.0.102/24 (IPv4)"));
    assert!(output.contains("Attribute     Value"));
    assert!(output.contains("hex           c0a80066"));
}

#[test]
fn dump_rejects_unparseable_address() {
    let (context, _) = make_test_context();
    let err = execute_command_with_context(
        CliCommand::Dump {
            json: false,
            addrs: vec!["10.0.0.1/33".to_string()],
        },
        &context,
    )
    .expect_err("bad mask should fail");
    assert!(format!("{:#}", err).contains("Failed to parse address '10.0.0.1/33'"));
}
