use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

/// Optional request throttling. Disabled unless RATE_LIMIT_ENABLED is set:
/// the deployed behavior has no login lockout policy, so throttling is an
/// operator opt-in rather than a default.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth: RateLimitRule,
    pub protected: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            auth: RateLimitRule::new(5, 10),
            protected: RateLimitRule::new(20, 40),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.enabled = parse_bool_env("RATE_LIMIT_ENABLED", cfg.enabled);

        if let Ok(raw) = env::var("RATE_LIMIT_CONFIG") {
            match parse_rate_limit_config(&raw) {
                Ok(parsed) => {
                    if let Some(rule) = parsed.auth {
                        cfg.auth = rule;
                    }
                    if let Some(rule) = parsed.protected {
                        cfg.protected = rule;
                    }
                }
                Err(err) => {
                    tracing::warn!("Invalid RATE_LIMIT_CONFIG '{}': {}", raw, err);
                }
            }
        }

        cfg
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PartialRateLimitConfig {
    auth: Option<RateLimitRule>,
    protected: Option<RateLimitRule>,
}

fn parse_bool_env(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn parse_rate_limit_config(raw: &str) -> Result<PartialRateLimitConfig, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }

    // Global format: "10:20" -> same rule for both groups.
    if !trimmed.contains('=') {
        let rule = parse_rule(trimmed)?;
        return Ok(PartialRateLimitConfig {
            auth: Some(rule),
            protected: Some(rule),
        });
    }

    // Grouped format: "auth=5:10,protected=20:40"
    let mut parsed = PartialRateLimitConfig::default();
    for item in trimmed.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (name, raw_rule) = item
            .split_once('=')
            .ok_or_else(|| format!("invalid item '{}', expected name=per:burst", item))?;
        let rule = parse_rule(raw_rule.trim())?;
        match name.trim().to_ascii_lowercase().as_str() {
            "auth" => parsed.auth = Some(rule),
            "protected" => parsed.protected = Some(rule),
            other => {
                return Err(format!("unknown group '{}', expected auth/protected", other));
            }
        }
    }

    Ok(parsed)
}

fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second_raw, burst_raw) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw))?;

    let per_second: u64 = per_second_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second_raw.trim()))?;
    let burst_size: u32 = burst_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst_raw.trim()))?;

    if per_second == 0 || burst_size == 0 {
        return Err("per_second and burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule::new(per_second, burst_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_global_rule() {
        let parsed = parse_rate_limit_config("12:24").unwrap();
        assert_eq!(parsed.auth, Some(RateLimitRule::new(12, 24)));
        assert_eq!(parsed.protected, Some(RateLimitRule::new(12, 24)));
    }

    #[test]
    fn parse_grouped_rules() {
        let parsed = parse_rate_limit_config("auth=1:2,protected=5:6").unwrap();
        assert_eq!(parsed.auth, Some(RateLimitRule::new(1, 2)));
        assert_eq!(parsed.protected, Some(RateLimitRule::new(5, 6)));
    }

    #[test]
    fn parse_unknown_group_fails() {
        let err = parse_rate_limit_config("public=3:4").unwrap_err();
        assert!(err.contains("unknown group"));
    }

    #[test]
    fn parse_zero_rule_fails() {
        assert!(parse_rate_limit_config("0:10").is_err());
    }
}
