use cargo_toml::{Dependency, Manifest};

/// Version of the fjall dependency this adapter was built against.
#[inline]
pub(crate) fn fjall_version() -> Result<String, String> {
    dependency_version(include_str!("../Cargo.toml"), "fjall")
}

fn dependency_version(cargo_toml: &str, name: &str) -> Result<String, String> {
    let manifest = Manifest::from_str(cargo_toml)
        .map_err(|e| format!("Failed to parse Cargo.toml: {}", e))?;

    let dependency = manifest
        .dependencies
        .get(name)
        .ok_or_else(|| format!("{} dependency not found in Cargo.toml", name))?;

    match dependency {
        Dependency::Simple(version) => Ok(version.clone()),
        Dependency::Detailed(d) => d
            .version
            .as_ref()
            .cloned()
            .ok_or_else(|| format!("{} dependency version not specified", name)),
        Dependency::Inherited(_) => Err(format!("Inherited {} dependency not supported", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_own_manifest() {
        let version = fjall_version().unwrap();
        assert!(version.starts_with('2'));
    }

    #[test]
    fn simple_and_detailed_dependencies() {
        let simple = r#"
        [package]
        name = "cats"
        version = "0.1.0"

        [dependencies]
        fjall = "2.6.3"
        "#;
        assert_eq!(dependency_version(simple, "fjall"), Ok("2.6.3".to_string()));

        let detailed = r#"
        [package]
        name = "cats"
        version = "0.1.0"

        [dependencies]
        fjall = { version = "2.6.3", features = ["bytes"] }
        "#;
        assert_eq!(dependency_version(detailed, "fjall"), Ok("2.6.3".to_string()));
    }

    #[test]
    fn inherited_and_missing_dependencies_fail() {
        let inherited = r#"
        [package]
        name = "cats"
        version = "0.1.0"

        [dependencies]
        fjall = { workspace = true }
        "#;
        assert!(dependency_version(inherited, "fjall").is_err());

        let missing = r#"
        [package]
        name = "cats"
        version = "0.1.0"

        [dependencies]
        other = "1.0.0"
        "#;
        let err = dependency_version(missing, "fjall").unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn invalid_manifest_fails() {
        let broken = r#"
        [package
        name = "cats"
        "#;
        assert!(dependency_version(broken, "fjall").is_err());
    }
}
