//! CIDR collapsing into minimal covering sets.

use ipnet::{Ipv4Net, Ipv6Net};
use std::collections::BTreeSet;

/// Collapse an IPv4 range set into the minimal non-overlapping cover.
///
/// Contained ranges are dropped and adjacent siblings merge into their
/// parent block. Pure and order-independent: the same input set always
/// collapses to the same output set.
pub fn collapse_v4(nets: &BTreeSet<Ipv4Net>) -> BTreeSet<Ipv4Net> {
    let input: Vec<Ipv4Net> = nets.iter().copied().collect();
    Ipv4Net::aggregate(&input).into_iter().collect()
}

/// Collapse an IPv6 range set into the minimal non-overlapping cover.
pub fn collapse_v6(nets: &BTreeSet<Ipv6Net>) -> BTreeSet<Ipv6Net> {
    let input: Vec<Ipv6Net> = nets.iter().copied().collect();
    Ipv6Net::aggregate(&input).into_iter().collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn ipv4_net_strategy() -> impl Strategy<Value = Ipv4Net> {
        (any::<u32>(), 8u8..=32).prop_map(|(addr, prefix)| {
            Ipv4Net::new(std::net::Ipv4Addr::from(addr), prefix)
                .unwrap()
                .trunc()
        })
    }

    fn ipv4_net_vec_strategy(max: usize) -> impl Strategy<Value = Vec<Ipv4Net>> {
        prop::collection::vec(ipv4_net_strategy(), 0..max)
    }

    proptest! {
        /// collapse(collapse(S)) == collapse(S)
        #[test]
        fn prop_collapse_idempotent(nets in ipv4_net_vec_strategy(50)) {
            let set: BTreeSet<Ipv4Net> = nets.into_iter().collect();
            let once = collapse_v4(&set);
            prop_assert_eq!(collapse_v4(&once.clone()), once);
        }

        /// Insertion order cannot matter: the set is the only input.
        #[test]
        fn prop_collapse_order_independent(nets in ipv4_net_vec_strategy(50)) {
            let forward: BTreeSet<Ipv4Net> = nets.iter().copied().collect();
            let reverse: BTreeSet<Ipv4Net> = nets.into_iter().rev().collect();
            prop_assert_eq!(collapse_v4(&forward), collapse_v4(&reverse));
        }

        /// No output range is contained in another output range.
        #[test]
        fn prop_no_contained_output(nets in ipv4_net_vec_strategy(40)) {
            let set: BTreeSet<Ipv4Net> = nets.into_iter().collect();
            let collapsed: Vec<Ipv4Net> = collapse_v4(&set).into_iter().collect();
            for (i, a) in collapsed.iter().enumerate() {
                for (j, b) in collapsed.iter().enumerate() {
                    if i != j {
                        prop_assert!(!a.contains(b), "{} contains {}", a, b);
                    }
                }
            }
        }

        /// Collapsing never grows the set.
        #[test]
        fn prop_collapse_never_grows(nets in ipv4_net_vec_strategy(50)) {
            let set: BTreeSet<Ipv4Net> = nets.into_iter().collect();
            prop_assert!(collapse_v4(&set).len() <= set.len());
        }

        /// Every input address stays covered by some output range.
        #[test]
        fn prop_coverage_preserved(nets in ipv4_net_vec_strategy(30)) {
            let set: BTreeSet<Ipv4Net> = nets.into_iter().collect();
            let collapsed = collapse_v4(&set);
            for net in &set {
                prop_assert!(
                    collapsed.iter().any(|c| c.contains(net)),
                    "{} not covered",
                    net
                );
            }
        }
    }
}
