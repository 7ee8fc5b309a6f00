use log::warn;
use std::collections::VecDeque;

/// One recorded position fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub lat: f64,
    pub lon: f64,
    /// Degrees clockwise from north, when the recorder had one
    pub heading: Option<f64>,
}

/// Parse `lat,lon[,heading]` lines. Blank lines and `#` comments are
/// skipped; malformed lines are logged and dropped.
pub fn parse_track(text: &str) -> VecDeque<Fix> {
    let mut fixes = VecDeque::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_fix(line) {
            Some(fix) => fixes.push_back(fix),
            None => warn!("track line {}: cannot read `{}`", idx + 1, line),
        }
    }
    fixes
}

fn parse_fix(line: &str) -> Option<Fix> {
    let mut parts = line.split(',').map(str::trim);
    let lat = parts.next()?.parse::<f64>().ok()?;
    let lon = parts.next()?.parse::<f64>().ok()?;
    let heading = match parts.next() {
        Some(h) if !h.is_empty() => Some(h.parse::<f64>().ok()?),
        _ => None,
    };
    if parts.next().is_some() || !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(Fix { lat, lon, heading })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track() {
        let text = "# morning ride\n41.38,2.17\n\n41.3801, 2.1702, 90\nnorth,east\n41.39,2.18,\n";
        let fixes = parse_track(text);
        assert_eq!(
            fixes,
            VecDeque::from(vec![
                Fix { lat: 41.38, lon: 2.17, heading: None },
                Fix { lat: 41.3801, lon: 2.1702, heading: Some(90.0) },
                Fix { lat: 41.39, lon: 2.18, heading: None },
            ])
        );
    }

    #[test]
    fn test_rejects_out_of_range_and_extra_fields() {
        assert!(parse_track("95.0,2.0\n").is_empty());
        assert!(parse_track("41.0,200.0\n").is_empty());
        assert!(parse_track("41.0,2.0,10,4\n").is_empty());
        assert!(parse_track("41.0,2.0,south\n").is_empty());
    }
}
