pub const APP_NAME: &str = "Price Estimator";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Release tag when built from a tagged checkout, else the package version.
pub fn version_label() -> String {
    let base = match GIT_TAG {
        Some(tag) => tag.to_string(),
        None => format!("v{APP_VERSION}"),
    };
    match GIT_COMMIT {
        Some(commit) => format!("{base} ({commit})"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_starts_with_tag_or_package_version() {
        let label = version_label();
        let expected = GIT_TAG.map_or_else(|| format!("v{APP_VERSION}"), str::to_string);
        assert!(label.starts_with(&expected), "{label}");
        if let Some(commit) = GIT_COMMIT {
            assert!(label.ends_with(&format!("({commit})")));
        }
    }
}
