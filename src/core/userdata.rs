//! Cloud-config userdata for VIRL: passwords and the salt license.
//!
//! The VIRL boot image reads these keys from the `#cloud-config` document:
//! - `virl_password`, `uwm_password`, `guest_password`
//! - `license_file` (the path as given) and `license_pem` (literal block)

use std::path::{Path, PathBuf};

const HEADER: &str = "#cloud-config";

/// Userdata requested on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserdataOptions {
    pub virl_password: Option<String>,
    pub uwm_password: Option<String>,
    pub guest_password: Option<String>,
    pub license_file: Option<PathBuf>,
}

impl UserdataOptions {
    /// True when nothing would end up in the cloud-config.
    pub fn is_empty(&self) -> bool {
        self.virl_password.is_none()
            && self.uwm_password.is_none()
            && self.guest_password.is_none()
            && self.license_file.is_none()
    }
}

/// A validated VIRL license (salt key) file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    /// Path exactly as the operator supplied it
    pub path: String,
    pub pem: String,
}

/// Validate and read a license file.
///
/// The file must exist and carry the `.pem` extension (`id.domain.tld.pem`).
pub fn load_license(path: &Path) -> Result<License, String> {
    if !path.is_file() {
        return Err("The VIRL license file specified does not exist.".to_string());
    }
    let display = path.to_string_lossy().to_string();
    if !display.ends_with(".pem") {
        return Err("The VIRL license file must end in \".pem\".".to_string());
    }
    let pem = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Ok(License { path: display, pem })
}

/// A cloud-config document ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudConfig {
    entries: Vec<(&'static str, String)>,
    license: Option<License>,
}

impl CloudConfig {
    /// Build from options. Returns `Ok(None)` when there is nothing to say.
    /// The license is validated before anything is rendered.
    pub fn from_options(opts: &UserdataOptions) -> Result<Option<Self>, String> {
        if opts.is_empty() {
            return Ok(None);
        }

        let mut entries = Vec::new();
        if let Some(ref pw) = opts.virl_password {
            entries.push(("virl_password", pw.clone()));
        }
        if let Some(ref pw) = opts.uwm_password {
            entries.push(("uwm_password", pw.clone()));
        }
        if let Some(ref pw) = opts.guest_password {
            entries.push(("guest_password", pw.clone()));
        }

        let license = match opts.license_file {
            Some(ref path) => Some(load_license(path)?),
            None => None,
        };

        Ok(Some(Self { entries, license }))
    }

    /// Compact rendering, embedded as `userdata` in a device request.
    pub fn render(&self) -> Result<String, String> {
        self.render_with("\n")
    }

    /// Spaced rendering for pasting into the Packet portal.
    pub fn render_spaced(&self) -> Result<String, String> {
        self.render_with("\n\n")
    }

    fn render_with(&self, sep: &str) -> Result<String, String> {
        let mut doc = String::from(HEADER);
        doc.push_str(sep);

        for (key, value) in &self.entries {
            doc.push_str(&format!("{}: {}{}", key, yaml_scalar(value)?, sep));
        }

        if let Some(ref license) = self.license {
            doc.push_str(&format!(
                "license_file: {}{}",
                yaml_scalar(&license.path)?,
                sep
            ));
            doc.push_str("license_pem: |\n");
            for line in license.pem.lines() {
                doc.push_str("  ");
                doc.push_str(line);
                doc.push('\n');
            }
        }

        Ok(doc)
    }
}

/// Render a string as a single YAML scalar, quoting only when required.
fn yaml_scalar(value: &str) -> Result<String, String> {
    let rendered =
        serde_yaml_ng::to_string(value).map_err(|e| format!("YAML serialize error: {}", e))?;
    Ok(rendered.trim_end_matches('\n').to_string())
}
