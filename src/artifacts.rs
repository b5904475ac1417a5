//! firewalld artifact generation: ipset XML and direct rules.
//!
//! Everything here is derived from the snapshot and regenerable from it.
//! Files are staged in the temp directory, validated as well-formed XML,
//! and only then renamed over the live paths.

use anyhow::{Context, Result};
use ipnet::{Ipv4Net, Ipv6Net};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Paths;

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// The static direct rules dropping traffic matched by either set.
fn render_direct_xml() -> String {
    let mut out = String::from(XML_DECL);
    out.push_str("<direct>\n");
    for (ipv, set, dir, way) in [
        ("ipv4", "blocked_v4", "INPUT", "src"),
        ("ipv4", "blocked_v4", "OUTPUT", "dst"),
        ("ipv6", "blocked_v6", "INPUT", "src"),
        ("ipv6", "blocked_v6", "OUTPUT", "dst"),
    ] {
        out.push_str(&format!(
            "   <rule ipv=\"{ipv}\" table=\"filter\" chain=\"{dir}\" priority=\"0\">\
             -m set --match-set {set} {way} -j DROP</rule>\n"
        ));
    }
    out.push_str("</direct>\n");
    out
}

/// Render a complete `hash:net` ipset file for one address family.
fn render_ipset<T: Display>(family: &str, entries: &BTreeSet<T>) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str("<ipset type=\"hash:net\">\n");
    out.push_str(&format!(
        "  <option name=\"family\" value=\"{family}\"/>\n"
    ));
    out.push_str(&format!(
        "  <option name=\"maxelem\" value=\"{}\"/>\n",
        entries.len()
    ));
    push_entries(&mut out, entries);
    out.push_str("</ipset>\n");
    out
}

fn push_entries<T: Display>(out: &mut String, entries: &BTreeSet<T>) {
    for entry in entries {
        out.push_str(&format!("  <entry>{entry}</entry>\n"));
    }
}

/// Check that `content` is well-formed XML: every event parses, end tags
/// match their start tags, and no element is left open at the end.
pub fn validate_xml(content: &str) -> Result<()> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().check_end_names = true;
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| anyhow::anyhow!("unmatched closing tag"))?;
            }
            Ok(Event::Eof) => {
                if depth != 0 {
                    anyhow::bail!("{} element(s) left unclosed", depth);
                }
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => anyhow::bail!("malformed XML at byte {}: {}", reader.error_position(), e),
        }
    }
}

fn validate_file(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} for validation", path.display()))?;
    validate_xml(&content)
        .with_context(|| format!("Failed to properly format {}; aborting swap", path.display()))?;
    debug!("Validated {}", path.display());
    Ok(())
}

fn promote(tmp: &Path, live: &Path) -> Result<()> {
    fs::rename(tmp, live).with_context(|| {
        format!(
            "Failed to replace {} with {}",
            live.display(),
            tmp.display()
        )
    })
}

fn staged(paths: &Paths, live: &Path) -> PathBuf {
    // Staging lives on the same filesystem as /etc/firewalld so the final
    // rename is atomic.
    let name = live
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact.xml".to_string());
    paths.temp_dir().join(format!("{name}.tmp"))
}

/// Regenerate all three artifacts from scratch and swap them in.
///
/// Nothing is promoted until every staged file has passed validation; a
/// validation failure leaves the live configuration untouched.
pub fn write_full(
    paths: &Paths,
    ipv4: &BTreeSet<Ipv4Net>,
    ipv6: &BTreeSet<Ipv6Net>,
) -> Result<()> {
    info!(
        "Writing ipsets ({} IPv4, {} IPv6 ranges) and direct rules...",
        ipv4.len(),
        ipv6.len()
    );

    let plan = [
        (staged(paths, &paths.direct_xml()), paths.direct_xml(), render_direct_xml()),
        (staged(paths, &paths.ipset_v4()), paths.ipset_v4(), render_ipset("inet", ipv4)),
        (staged(paths, &paths.ipset_v6()), paths.ipset_v6(), render_ipset("inet6", ipv6)),
    ];

    for (tmp, _, content) in &plan {
        fs::write(tmp, content)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
    }
    for (tmp, _, _) in &plan {
        validate_file(tmp)?;
    }
    for (tmp, live, _) in &plan {
        promote(tmp, live)?;
    }
    Ok(())
}

/// Append newly seen ranges to the existing ipset files.
///
/// Each live file is copied to the staging area, its closing tag is
/// stripped, the new entries are appended, and the file is re-closed,
/// validated, and swapped back. The direct rules are left untouched.
pub fn append_entries(
    paths: &Paths,
    add_v4: &BTreeSet<Ipv4Net>,
    add_v6: &BTreeSet<Ipv6Net>,
) -> Result<()> {
    info!(
        "Appending {} IPv4 and {} IPv6 ranges to existing ipsets...",
        add_v4.len(),
        add_v6.len()
    );

    let v4_tmp = staged(paths, &paths.ipset_v4());
    let v6_tmp = staged(paths, &paths.ipset_v6());

    stage_appended(&paths.ipset_v4(), &v4_tmp, add_v4)?;
    stage_appended(&paths.ipset_v6(), &v6_tmp, add_v6)?;

    validate_file(&v4_tmp)?;
    validate_file(&v6_tmp)?;

    promote(&v4_tmp, &paths.ipset_v4())?;
    promote(&v6_tmp, &paths.ipset_v6())?;
    Ok(())
}

fn stage_appended<T: Display>(live: &Path, tmp: &Path, add: &BTreeSet<T>) -> Result<()> {
    let content = fs::read_to_string(live)
        .with_context(|| format!("Failed to read live ipset {}", live.display()))?;
    let mut content = strip_closing_tag(&content)
        .with_context(|| format!("Unexpected ipset structure in {}", live.display()))?;
    push_entries(&mut content, add);
    content.push_str("</ipset>\n");
    fs::write(tmp, content).with_context(|| format!("Failed to write {}", tmp.display()))
}

/// Drop the trailing `</ipset>` so new entries can be appended.
fn strip_closing_tag(content: &str) -> Result<String> {
    match content.rfind("</ipset>") {
        Some(idx) => Ok(content[..idx].to_string()),
        None => anyhow::bail!("missing closing </ipset> tag"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn v4_set(items: &[&str]) -> BTreeSet<Ipv4Net> {
        items.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn v6_set(items: &[&str]) -> BTreeSet<Ipv6Net> {
        items.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn scratch_paths() -> (tempfile::TempDir, Paths) {
        let root = tempdir().unwrap();
        let paths = Paths::new(root.path().join("state"), root.path().join("fw"));
        paths.bootstrap().unwrap();
        (root, paths)
    }

    #[test]
    fn test_direct_xml_shape() {
        let xml = render_direct_xml();
        validate_xml(&xml).unwrap();
        assert_eq!(xml.matches("<rule").count(), 4);
        assert!(xml.contains("--match-set blocked_v4 src -j DROP"));
        assert!(xml.contains("--match-set blocked_v6 dst -j DROP"));
    }

    #[test]
    fn test_ipset_render() {
        let xml = render_ipset("inet", &v4_set(&["10.0.0.0/8", "192.0.2.0/24"]));
        validate_xml(&xml).unwrap();
        assert!(xml.contains("<option name=\"family\" value=\"inet\"/>"));
        assert!(xml.contains("<option name=\"maxelem\" value=\"2\"/>"));
        assert!(xml.contains("<entry>10.0.0.0/8</entry>"));
        assert!(xml.contains("<entry>192.0.2.0/24</entry>"));
    }

    #[test]
    fn test_validate_rejects_unclosed() {
        assert!(validate_xml("<ipset><entry>1.2.3.0/24</entry>").is_err());
        assert!(validate_xml("<a></b>").is_err());
        assert!(validate_xml("<a><b/></a>").is_ok());
    }

    #[test]
    fn test_write_full_creates_live_artifacts() {
        let (_root, paths) = scratch_paths();
        write_full(
            &paths,
            &v4_set(&["10.0.0.0/8"]),
            &v6_set(&["2001:db8::/32"]),
        )
        .unwrap();

        for live in paths.live_artifacts() {
            assert!(live.exists(), "{} missing", live.display());
            validate_file(&live).unwrap();
        }
        let v4 = fs::read_to_string(paths.ipset_v4()).unwrap();
        assert!(v4.contains("<entry>10.0.0.0/8</entry>"));
        let v6 = fs::read_to_string(paths.ipset_v6()).unwrap();
        assert!(v6.contains("<entry>2001:db8::/32</entry>"));
        // No staged leftovers after promotion.
        assert_eq!(fs::read_dir(paths.temp_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_append_preserves_existing_entries() {
        let (_root, paths) = scratch_paths();
        write_full(&paths, &v4_set(&["1.2.3.0/24"]), &BTreeSet::new()).unwrap();

        append_entries(&paths, &v4_set(&["5.6.7.0/24"]), &BTreeSet::new()).unwrap();

        let v4 = fs::read_to_string(paths.ipset_v4()).unwrap();
        assert!(v4.contains("<entry>1.2.3.0/24</entry>"));
        assert!(v4.contains("<entry>5.6.7.0/24</entry>"));
        assert_eq!(v4.matches("</ipset>").count(), 1);
        validate_xml(&v4).unwrap();
    }

    #[test]
    fn test_append_without_live_file_fails() {
        let (_root, paths) = scratch_paths();
        let result = append_entries(&paths, &v4_set(&["5.6.7.0/24"]), &BTreeSet::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_strip_closing_tag() {
        let stripped = strip_closing_tag("<ipset>\n  <entry>x</entry>\n</ipset>\n").unwrap();
        assert!(!stripped.contains("</ipset>"));
        assert!(strip_closing_tag("<ipset>\n").is_err());
    }

    #[test]
    fn test_full_replace_overwrites_previous() {
        let (_root, paths) = scratch_paths();
        write_full(&paths, &v4_set(&["1.2.3.0/24"]), &BTreeSet::new()).unwrap();
        write_full(&paths, &v4_set(&["9.9.9.0/24"]), &BTreeSet::new()).unwrap();

        let v4 = fs::read_to_string(paths.ipset_v4()).unwrap();
        assert!(!v4.contains("1.2.3.0/24"));
        assert!(v4.contains("9.9.9.0/24"));
    }
}
