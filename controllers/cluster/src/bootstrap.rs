//! Bootstrap scripts
//!
//! Scripts are looked up as `bootstrap/<script>` in an asset store and
//! rendered with the cluster's substitution map before being sent to the
//! provider as droplet user data.

use crate::error::ControllerError;
use handlebars::Handlebars;
use rand::Rng;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Substitution key for `<master private address>:<api port>`
pub const INJECTED_MASTER: &str = "INJECTEDMASTER";
/// Substitution key for the cluster name
pub const INJECTED_NAME: &str = "INJECTEDNAME";
/// Substitution key for the Kubernetes API port
pub const INJECTED_PORT: &str = "INJECTEDPORT";
/// Substitution key for the kubeadm bootstrap token shared by master and nodes
pub const INJECTED_TOKEN: &str = "INJECTEDTOKEN";

const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random kubeadm bootstrap token, `[a-z0-9]{6}.[a-z0-9]{16}`
#[must_use]
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let mut part = |len: usize| -> String {
        (0..len)
            .map(|_| char::from(TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())]))
            .collect()
    };
    let id = part(6);
    let secret = part(16);
    format!("{id}.{secret}")
}

/// Whether `token` has the kubeadm bootstrap token shape
#[must_use]
pub fn is_valid_token(token: &str) -> bool {
    let valid = |part: &str, len: usize| {
        part.len() == len && part.bytes().all(|b| TOKEN_ALPHABET.contains(&b))
    };
    token
        .split_once('.')
        .is_some_and(|(id, secret)| valid(id, 6) && valid(secret, 16))
}

/// Asset path of a pool's bootstrap script
#[must_use]
pub fn asset_path(script: &str) -> String {
    format!("bootstrap/{script}")
}

/// Named script lookup
pub trait AssetStore: Send + Sync {
    /// Bytes of the asset at `path`
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::AssetNotFound`] if no asset has that path.
    fn asset(&self, path: &str) -> Result<Vec<u8>, ControllerError>;
}

const EMBEDDED: &[(&str, &[u8])] = &[
    (
        "bootstrap/digitalocean_k8s_ubuntu_master.sh",
        include_bytes!("../bootstrap/digitalocean_k8s_ubuntu_master.sh"),
    ),
    (
        "bootstrap/digitalocean_k8s_ubuntu_node.sh",
        include_bytes!("../bootstrap/digitalocean_k8s_ubuntu_node.sh"),
    ),
];

/// Scripts compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

impl AssetStore for EmbeddedAssets {
    fn asset(&self, path: &str) -> Result<Vec<u8>, ControllerError> {
        EMBEDDED
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, bytes)| bytes.to_vec())
            .ok_or_else(|| ControllerError::AssetNotFound(path.to_string()))
    }
}

/// Scripts read from a directory; `bootstrap/x.sh` resolves to `<root>/bootstrap/x.sh`
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetStore for DirectoryAssets {
    fn asset(&self, path: &str) -> Result<Vec<u8>, ControllerError> {
        let relative = Path::new(path);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(ControllerError::AssetNotFound(path.to_string()));
        }

        let full = self.root.join(relative);
        debug!(path = %full.display(), "Reading bootstrap asset");
        std::fs::read(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ControllerError::AssetNotFound(full.display().to_string())
            } else {
                ControllerError::Io { path: full, source }
            }
        })
    }
}

/// Substitute `{{ KEY }}` markers in `script` with values from `values`
///
/// Output is not escaped. A marker naming a key absent from `values` is an
/// error, as is any malformed marker.
///
/// # Errors
///
/// Returns [`ControllerError::Template`] if the script is not UTF-8, cannot
/// be parsed, or references an unknown key or helper.
pub fn inject(
    script_name: &str,
    script: &[u8],
    values: &BTreeMap<String, String>,
) -> Result<Vec<u8>, ControllerError> {
    let template_error = |reason: String| ControllerError::Template {
        script: script_name.to_string(),
        reason,
    };

    let source = std::str::from_utf8(script).map_err(|e| template_error(e.to_string()))?;

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .render_template(source, values)
        .map(String::into_bytes)
        .map_err(|e| template_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_generated_tokens_are_kubeadm_shaped() {
        let first = generate_token();
        let second = generate_token();
        assert!(is_valid_token(&first), "{first}");
        assert!(is_valid_token(&second), "{second}");
        assert_ne!(first, second);
    }

    #[test]
    fn test_is_valid_token() {
        assert!(is_valid_token("abcdef.0123456789abcdef"));
        assert!(!is_valid_token("ABCDEF.0123456789abcdef"));
        assert!(!is_valid_token("abcdef0123456789abcdef"));
        assert!(!is_valid_token("abcde.0123456789abcdef"));
        assert!(!is_valid_token("abcdef.0123456789abcde!"));
    }

    #[test]
    fn test_inject_substitutes_reserved_keys() {
        let script = b"MASTER={{ INJECTEDMASTER }}\nNAME={{INJECTEDNAME}}\nPORT={{ INJECTEDPORT }}\n";
        let values = values(&[
            (INJECTED_MASTER, "10.0.0.5:443"),
            (INJECTED_NAME, "demo"),
            (INJECTED_PORT, "443"),
        ]);

        let rendered = String::from_utf8(inject("test.sh", script, &values).unwrap()).unwrap();

        assert_eq!(rendered, "MASTER=10.0.0.5:443\nNAME=demo\nPORT=443\n");
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_inject_does_not_escape() {
        let values = values(&[("CMD", "a && b < 'c'")]);
        let rendered = inject("test.sh", b"{{ CMD }}", &values).unwrap();
        assert_eq!(rendered, b"a && b < 'c'");
    }

    #[test]
    fn test_inject_leaves_shell_syntax_alone() {
        let values = values(&[("X", "1")]);
        let rendered = inject("test.sh", b"echo ${HOME} $(date) {{ X }}", &values).unwrap();
        assert_eq!(rendered, b"echo ${HOME} $(date) 1");
    }

    #[test]
    fn test_inject_rejects_unterminated_marker() {
        let err = inject("broken.sh", b"NAME={{ INJECTEDNAME", &values(&[(INJECTED_NAME, "demo")]))
            .unwrap_err();
        assert!(matches!(err, ControllerError::Template { ref script, .. } if script == "broken.sh"));
    }

    #[test]
    fn test_inject_rejects_unknown_key() {
        let err = inject("test.sh", b"{{ INJECTEDMASTER }}", &values(&[])).unwrap_err();
        assert!(matches!(err, ControllerError::Template { .. }));
    }

    #[test]
    fn test_embedded_scripts_render_with_reserved_keys() {
        let values = values(&[
            (INJECTED_MASTER, "10.0.0.5:443"),
            (INJECTED_NAME, "demo"),
            (INJECTED_PORT, "443"),
            ("INJECTEDTOKEN", "abcdef.0123456789abcdef"),
        ]);

        for script in ["digitalocean_k8s_ubuntu_master.sh", "digitalocean_k8s_ubuntu_node.sh"] {
            let raw = EmbeddedAssets.asset(&asset_path(script)).unwrap();
            let rendered = String::from_utf8(inject(script, &raw, &values).unwrap()).unwrap();
            assert!(!rendered.contains("{{"), "{script} still has markers");
            assert!(rendered.contains("CLUSTER_NAME=\"demo\""));
        }
    }

    #[test]
    fn test_embedded_missing_asset() {
        let err = EmbeddedAssets.asset("bootstrap/nope.sh").unwrap_err();
        assert!(matches!(err, ControllerError::AssetNotFound(ref p) if p == "bootstrap/nope.sh"));
    }

    #[test]
    fn test_directory_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("bootstrap")).unwrap();
        std::fs::write(dir.path().join("bootstrap").join("custom.sh"), "echo {{ INJECTEDNAME }}").unwrap();
        let store = DirectoryAssets::new(dir.path());

        assert_eq!(store.asset("bootstrap/custom.sh").unwrap(), b"echo {{ INJECTEDNAME }}");
        assert!(matches!(
            store.asset("bootstrap/missing.sh"),
            Err(ControllerError::AssetNotFound(_))
        ));
        assert!(matches!(
            store.asset("bootstrap/../../etc/passwd"),
            Err(ControllerError::AssetNotFound(_))
        ));
    }
}
