use blockhole_core::Blocklist;
use tracing::info;

/// Remove allowed domains from `merged`.
///
/// A domain is removed when it exactly matches one of `allow_domains` or a
/// domain key of any list in `allowlists`. No suffix or wildcard matching.
#[must_use]
pub fn apply_allowlists(
    mut merged: Blocklist,
    allowlists: &[Blocklist],
    allow_domains: &[String],
) -> Blocklist {
    let listed = allowlists
        .iter()
        .flat_map(|list| list.domains().map(move |domain| (domain, list.origin.as_str())));
    let explicit = allow_domains.iter().map(|domain| (domain.as_str(), "command line"));

    for (domain, origin) in explicit.chain(listed) {
        if merged.remove(domain).is_some() {
            info!(domain, allowed_by = origin, "removed allowed domain from merged list");
        }
    }
    merged
}
