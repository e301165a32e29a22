//! Record value normalization
//!
//! The remote store keeps TXT ownership records without quotes, keeps CNAME
//! targets as given, and marks the zone apex with the null host `@`. These
//! helpers translate between that wire form and external-dns names/values, so
//! no other module needs to know about `@` or the quoting rules.

/// Host label the remote store uses for the zone apex.
const NULL_HOST: &str = "@";

/// Prefix of external-dns ownership TXT values.
const HERITAGE_PREFIX: &str = "heritage=";

/// Strip every quote from a pre-quoted `"heritage=..."` value; anything else is unchanged.
pub fn escape_txt(value: &str) -> String {
    if value
        .strip_prefix('"')
        .is_some_and(|rest| rest.starts_with(HERITAGE_PREFIX))
    {
        value.replace('"', "")
    } else {
        value.to_string()
    }
}

/// Wrap an unquoted `heritage=...` value in double quotes; anything else is unchanged.
pub fn unescape_txt(value: &str) -> String {
    if value.starts_with(HERITAGE_PREFIX) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Remove a single trailing dot from a CNAME target.
pub fn clean_cname(value: &str) -> String {
    value.strip_suffix('.').unwrap_or(value).to_string()
}

/// Append a trailing dot to a CNAME target unless it already has one.
pub fn complete_cname(value: &str) -> String {
    if value.ends_with('.') {
        value.to_string()
    } else {
        format!("{value}.")
    }
}

/// Value as external-dns sees it: TXT unescaped, CNAME without trailing dot.
///
/// Used both to denormalize values read back from the store and to compare
/// stored values with caller-supplied targets.
pub fn canonical_value(record_type: &str, value: &str) -> String {
    if record_type.eq_ignore_ascii_case("TXT") {
        unescape_txt(value)
    } else if record_type.eq_ignore_ascii_case("CNAME") {
        clean_cname(value)
    } else {
        value.to_string()
    }
}

/// Whether `host` is the zone-apex sentinel.
pub fn is_apex(host: &str) -> bool {
    host == NULL_HOST
}

/// Fully-qualified name of `host` inside `zone_name`.
pub fn host_for(host: &str, zone_name: &str) -> String {
    if is_apex(host) {
        zone_name.to_string()
    } else {
        format!("{host}.{zone_name}")
    }
}

/// Split `fqdn` into `(host, domain)` relative to `zone_name`.
///
/// A trailing dot on `fqdn` is ignored and suffixes compare ASCII
/// case-insensitively. The zone's own name yields host `@`. A name outside the
/// zone yields host `@` and an **empty** domain; callers must check the domain.
pub fn split_host_and_zone(fqdn: &str, zone_name: &str) -> (String, String) {
    let name = fqdn.strip_suffix('.').unwrap_or(fqdn);

    if name.eq_ignore_ascii_case(zone_name) {
        return (NULL_HOST.to_string(), zone_name.to_string());
    }

    if let Some(split) = name.len().checked_sub(zone_name.len() + 1)
        && name.is_char_boundary(split)
    {
        let (host, suffix) = name.split_at(split);
        // suffix = "." + zone
        if !host.is_empty()
            && suffix
                .strip_prefix('.')
                .is_some_and(|zone| zone.eq_ignore_ascii_case(zone_name))
        {
            return (host.to_string(), zone_name.to_string());
        }
    }

    (NULL_HOST.to_string(), String::new())
}
