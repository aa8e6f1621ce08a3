use anyhow::Result;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let raw = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into());
        Ok(Self {
            cors_allowed_origins: parse_origins(&raw),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        let origins = parse_origins(" http://a.example ,, http://b.example ");
        assert_eq!(origins, vec!["http://a.example", "http://b.example"]);
    }

    #[test]
    fn empty_origin_list_stays_empty() {
        assert!(parse_origins("  ,").is_empty());
    }
}
