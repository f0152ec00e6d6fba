//! Tests for the socket address value type

#[cfg(test)]
mod tests {
    use super::super::*;

    fn sa(s: &str) -> SockAddr {
        SockAddr::parse(s).unwrap_or_else(|e| panic!("{s} should parse: {e}"))
    }

    #[test]
    fn test_parse_dispatches_by_family() {
        assert_eq!(sa("10.0.0.0/8").addr_type(), SockAddrType::Ipv4);
        assert_eq!(sa("128.95.120.2:53").addr_type(), SockAddrType::Ipv4);
        assert_eq!(sa("fe80::1/64").addr_type(), SockAddrType::Ipv6);
        assert_eq!(sa("[::1]:8600").addr_type(), SockAddrType::Ipv6);
        assert_eq!(sa("/tmp/test").addr_type(), SockAddrType::Unix);
        assert_eq!(sa("./run/app.sock").addr_type(), SockAddrType::Unix);
        assert_eq!(sa("run/app.sock").addr_type(), SockAddrType::Unix);
    }

    #[test]
    fn test_parse_rejects_malformed_without_partial_results() {
        for bad in ["", "10.0.0.0/33", "10.0.0.1:http", "fe80::/200", "not-an-address", "[::1", "x"] {
            let err = SockAddr::parse(bad).expect_err(bad);
            assert!(matches!(err, SockAddrError::Parse { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn test_cidr_round_trip_is_canonical() {
        let inputs = [
            "10.0.0.0/8",
            "172.16.1.3/12",
            "192.168.0.0/16",
            "128.95.120.1",
            "192.168.1.10/24",
            "240.0.0.1/4",
            "fe80::1/64",
            "2406:7400:63:ef5:1415:8bc3:fa5e:2578/64",
            "::1",
            "[::1]:53",
            "/var/run/app.sock",
        ];
        for input in inputs {
            let rendered = sa(input).to_string();
            assert_eq!(rendered, input);
            assert_eq!(sa(&rendered).to_string(), rendered);
        }
        // Non-canonical IPv6 text renders compressed
        assert_eq!(sa("2607:f0d0:1002:0051:0000:0000:0000:0004").to_string(), "2607:f0d0:1002:51::4");
        assert_eq!(sa("128.95.120.1/32").to_string(), "128.95.120.1");
    }

    #[test]
    fn test_equality_includes_mask_and_port() {
        assert_eq!(sa("10.0.0.1"), sa("10.0.0.1/32"));
        assert_ne!(sa("10.0.0.1/8"), sa("10.0.0.1/16"));
        assert_ne!(sa("10.0.0.1:80"), sa("10.0.0.1:81"));
        assert_ne!(sa("10.0.0.1:80"), sa("10.0.0.1"));
        assert_eq!(sa("[::1]:80"), sa("[::1]:80"));
        assert_ne!(sa("::ffff:10.0.0.1"), sa("10.0.0.1"));
    }

    #[test]
    fn test_contains_reflexive() {
        for input in ["10.0.0.0/8", "0.0.0.0/0", "fe80::/10", "::1", "/tmp/sock"] {
            let net = sa(input);
            assert!(net.contains(&net), "{input}");
        }
    }

    #[test]
    fn test_contains_transitive_over_nested_networks() {
        let nested = ["10.0.0.0/8", "10.1.0.0/16", "10.1.2.0/24", "10.1.2.3"];
        for (i, outer) in nested.iter().enumerate() {
            for inner in &nested[i..] {
                assert!(sa(outer).contains(&sa(inner)), "{outer} should contain {inner}");
            }
        }
        assert!(!sa("10.1.2.0/24").contains(&sa("10.1.0.0/16")));
    }

    #[test]
    fn test_contains_is_false_across_families() {
        assert!(!sa("0.0.0.0/0").contains(&sa("::1")));
        assert!(!sa("::/0").contains(&sa("127.0.0.1")));
        assert!(!sa("::/0").contains(&sa("/tmp/x")));
        assert!(!sa("/tmp/x").contains(&sa("/tmp/y")));
    }

    #[test]
    fn test_offset_address_is_a_group_action() {
        let deltas: [i128; 7] = [0, 1, -1, 16_777_217, -4_278_190_082, 4_294_967_296, -(1i128 << 100)];
        for input in ["127.0.0.1/8", "255.255.255.255", "::1", "fe80::1/64"] {
            let addr = sa(input);
            for d1 in deltas {
                for d2 in deltas {
                    assert_eq!(
                        addr.offset_address(d1).offset_address(d2),
                        addr.offset_address(d1 + d2),
                        "{input} {d1} {d2}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_offset_preserves_mask_and_port() {
        let shifted = sa("10.0.0.1:8080").offset_address(5);
        assert_eq!(shifted.port(), Some(8080));
        assert_eq!(shifted.to_string(), "10.0.0.6:8080");

        let shifted = sa("fe80::1/64").offset_network(7);
        assert_eq!(shifted.mask_bits(), Some(64));
        assert_eq!(shifted.to_string(), "fe80::7/64");
    }

    #[test]
    fn test_unix_offsets_are_identity() {
        let path = sa("/tmp/test");
        assert_eq!(path.offset_address(10), path);
        assert_eq!(path.offset_network(-10), path);
    }

    #[test]
    fn test_type_set_parsing() {
        let set: TypeSet = "IPv4|IPv6".parse().unwrap();
        assert_eq!(set, TypeSet::IP);
        let set: TypeSet = "unix".parse().unwrap();
        assert!(set.contains(SockAddrType::Unix));
        assert!(!set.contains(SockAddrType::Ipv4));
        assert!(matches!("IPv5".parse::<TypeSet>(), Err(SockAddrError::UnknownType(_))));
    }
}
