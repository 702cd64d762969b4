/// Converts a size string with an optional K/M/G/T suffix into gigabytes.
///
/// The sampler emits sizes the way `lsblk`/`df -h` print them (`"512M"`,
/// `"1.8T"`, `"100G"`). A bare number is already in GB. Absent or unparsable
/// input normalizes to 0.0; by convention 0.0 doubles as the "no data"
/// sentinel, so this never errors.
pub fn size_to_gb(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    let (number, suffix) = match s.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&s[..idx], Some(c.to_ascii_uppercase())),
        _ => (s, None),
    };

    let value: f64 = match number.parse() {
        Ok(v) => v,
        Err(_) => return 0.0,
    };

    match suffix {
        Some('K') => value / 1024.0 / 1024.0,
        Some('M') => value / 1024.0,
        Some('G') | None => value,
        Some('T') => value * 1024.0,
        Some(_) => 0.0,
    }
}
